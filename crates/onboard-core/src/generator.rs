use crate::checklist::{ChecklistItem, OnboardingChecklist, Priority};
use crate::user::User;
use chrono::{Duration, Utc};

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

struct TaskTemplate {
    title: &'static str,
    description: &'static str,
    category: &'static str,
    priority: Priority,
    estimated_time: u32,
    /// Due `n` days after generation; `None` means no due date.
    due_in_days: Option<i64>,
}

/// Day 1: Welcome & Introduction tasks, in presentation order.
const DAY_ONE_TASKS: &[TaskTemplate] = &[
    TaskTemplate {
        title: "Attend orientation session",
        description: "Complete the company orientation and welcome session",
        category: "Administrative",
        priority: Priority::High,
        estimated_time: 60,
        due_in_days: Some(1),
    },
    TaskTemplate {
        title: "Meet team members and manager",
        description: "Introduction meeting with your direct team and manager",
        category: "Meetings",
        priority: Priority::High,
        estimated_time: 45,
        due_in_days: Some(1),
    },
    TaskTemplate {
        title: "Company mission, vision, and values walkthrough",
        description: "Learn about company culture, mission, vision, and core values",
        category: "Learning",
        priority: Priority::High,
        estimated_time: 30,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Introduction to buddy/mentor (if applicable)",
        description: "Meet your assigned buddy or mentor for guidance and support",
        category: "Mentorship",
        priority: Priority::Medium,
        estimated_time: 30,
        due_in_days: None,
    },
    TaskTemplate {
        title: "HR and admin onboarding session",
        description: "Complete HR paperwork, policies, and administrative setup",
        category: "Administrative",
        priority: Priority::High,
        estimated_time: 45,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Access to communication tools (Slack, Teams, Zoom, etc.)",
        description: "Set up and configure communication platforms",
        category: "Setup",
        priority: Priority::High,
        estimated_time: 20,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Access to internal portals (HRMS, intranet, ticketing system)",
        description: "Get access to internal company systems and portals",
        category: "Setup",
        priority: Priority::High,
        estimated_time: 30,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Development tools set up (GitHub, Jira, IDEs)",
        description: "Configure development environment and tools",
        category: "Setup",
        priority: Priority::Medium,
        estimated_time: 60,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Access to project management tools",
        description: "Set up access to project tracking and management systems",
        category: "Setup",
        priority: Priority::Medium,
        estimated_time: 15,
        due_in_days: None,
    },
    TaskTemplate {
        title: "Tech stack overview (if technical role)",
        description: "Introduction to technologies and frameworks used",
        category: "Learning",
        priority: Priority::Medium,
        estimated_time: 45,
        due_in_days: None,
    },
];

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Build the default checklist for a new user from the static templates.
///
/// Item ids are `{user.id}_task_{index}`, so regenerating for the same user
/// yields the same ids in the same order. All items start incomplete and the
/// aggregate's progress starts at 0. Reads nothing, never fails.
pub fn generate(user: &User) -> OnboardingChecklist {
    let now = Utc::now();
    let items = DAY_ONE_TASKS
        .iter()
        .enumerate()
        .map(|(index, template)| ChecklistItem {
            id: format!("{}_task_{}", user.id, index),
            title: template.title.to_string(),
            description: template.description.to_string(),
            category: template.category.to_string(),
            priority: template.priority,
            estimated_time: template.estimated_time,
            completed: false,
            due_date: template.due_in_days.map(|days| now + Duration::days(days)),
        })
        .collect();
    OnboardingChecklist::new(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
