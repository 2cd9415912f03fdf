use crate::progress;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PreboardFlag
// ---------------------------------------------------------------------------

/// The seven fixed preboarding steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreboardFlag {
    OfferLetter,
    BackgroundVerification,
    IdentityProof,
    BankDetails,
    EmergencyContacts,
    EquipmentShipped,
    WelcomeEmail,
}

impl PreboardFlag {
    pub const ALL: [PreboardFlag; 7] = [
        PreboardFlag::OfferLetter,
        PreboardFlag::BackgroundVerification,
        PreboardFlag::IdentityProof,
        PreboardFlag::BankDetails,
        PreboardFlag::EmergencyContacts,
        PreboardFlag::EquipmentShipped,
        PreboardFlag::WelcomeEmail,
    ];
}

// ---------------------------------------------------------------------------
// PreboardingFlags
// ---------------------------------------------------------------------------

/// Per-user preboarding state: a fixed record of boolean flags, all
/// independently togglable. Field names serialize in camelCase so blobs
/// written by earlier builds of the portal still parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreboardingFlags {
    pub offer_letter: bool,
    pub background_verification: bool,
    pub identity_proof: bool,
    pub bank_details: bool,
    pub emergency_contacts: bool,
    pub equipment_shipped: bool,
    pub welcome_email: bool,
}

impl PreboardingFlags {
    pub fn get(&self, flag: PreboardFlag) -> bool {
        match flag {
            PreboardFlag::OfferLetter => self.offer_letter,
            PreboardFlag::BackgroundVerification => self.background_verification,
            PreboardFlag::IdentityProof => self.identity_proof,
            PreboardFlag::BankDetails => self.bank_details,
            PreboardFlag::EmergencyContacts => self.emergency_contacts,
            PreboardFlag::EquipmentShipped => self.equipment_shipped,
            PreboardFlag::WelcomeEmail => self.welcome_email,
        }
    }

    pub fn set(&mut self, flag: PreboardFlag, value: bool) {
        match flag {
            PreboardFlag::OfferLetter => self.offer_letter = value,
            PreboardFlag::BackgroundVerification => self.background_verification = value,
            PreboardFlag::IdentityProof => self.identity_proof = value,
            PreboardFlag::BankDetails => self.bank_details = value,
            PreboardFlag::EmergencyContacts => self.emergency_contacts = value,
            PreboardFlag::EquipmentShipped => self.equipment_shipped = value,
            PreboardFlag::WelcomeEmail => self.welcome_email = value,
        }
    }

    pub fn toggle(&mut self, flag: PreboardFlag) -> bool {
        let next = !self.get(flag);
        self.set(flag, next);
        next
    }

    pub fn completed_count(&self) -> usize {
        PreboardFlag::ALL.iter().filter(|f| self.get(**f)).count()
    }

    pub fn total_count(&self) -> usize {
        PreboardFlag::ALL.len()
    }

    pub fn progress(&self) -> u8 {
        progress::percentage(self.completed_count(), self.total_count())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
