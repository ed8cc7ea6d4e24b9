//! Pet record shape, value domains and payload validation.
//!
//! # Responsibility
//! - Define the canonical `Pet` record and its `Gender` domain.
//! - Normalize caller payloads into insert/update shapes.
//!
//! # Invariants
//! - `name` is never blank after normalization.
//! - `gender` is one of the three enumerated codes; other integers are rejected.
//! - `weight` is never negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned record identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PetId = i64;

/// Gender domain stored as an integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Integer code persisted in the `gender` column.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => GENDER_UNKNOWN,
            Self::Male => GENDER_MALE,
            Self::Female => GENDER_FEMALE,
        }
    }

    /// Maps a stored or submitted code back into the domain.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            GENDER_UNKNOWN => Some(Self::Unknown),
            GENDER_MALE => Some(Self::Male),
            GENDER_FEMALE => Some(Self::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub const GENDER_UNKNOWN: i64 = 0;
pub const GENDER_MALE: i64 = 1;
pub const GENDER_FEMALE: i64 = 2;

/// One catalog entry as owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    /// Empty when the breed is unknown.
    pub breed: String,
    pub gender: Gender,
    pub weight: u32,
}

/// Raw field payload keyed by column name.
///
/// Every field is optional: inserts fill defaults, updates leave absent
/// fields untouched. `gender` and `weight` stay as raw integers so
/// out-of-domain values reach validation instead of failing earlier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PetFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl PetFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender.code());
        self
    }

    /// Sets a raw gender code, bypassing the enum. Validation decides.
    pub fn gender_code(mut self, code: i64) -> Self {
        self.gender = Some(code);
        self
    }

    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.gender.is_none() && self.weight.is_none()
    }
}

/// Normalized insert payload with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub breed: String,
    pub gender: Gender,
    pub weight: u32,
}

/// Normalized partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetPatch {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<Gender>,
    pub weight: Option<u32>,
}

impl PetPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.gender.is_none() && self.weight.is_none()
    }

    /// Applies this patch over an existing record.
    pub fn apply_to(&self, pet: &mut Pet) {
        if let Some(name) = &self.name {
            pet.name.clone_from(name);
        }
        if let Some(breed) = &self.breed {
            pet.breed.clone_from(breed);
        }
        if let Some(gender) = self.gender {
            pet.gender = gender;
        }
        if let Some(weight) = self.weight {
            pet.weight = weight;
        }
    }
}

/// Reasons a payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    MissingName,
    BlankName,
    NegativeWeight(i64),
    WeightOutOfRange(i64),
    InvalidGender(i64),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "pet requires a name"),
            Self::BlankName => write!(f, "pet name cannot be blank"),
            Self::NegativeWeight(value) => write!(f, "pet weight cannot be negative: {value}"),
            Self::WeightOutOfRange(value) => write!(f, "pet weight is out of range: {value}"),
            Self::InvalidGender(value) => {
                write!(f, "pet gender code {value} is not one of 0, 1, 2")
            }
        }
    }
}

impl Error for PetValidationError {}

/// Validates an insert payload and fills documented defaults.
pub fn validate_for_insert(fields: &PetFields) -> Result<NewPet, PetValidationError> {
    let name = match fields.name.as_deref() {
        Some(value) => normalize_name(value)?,
        None => return Err(PetValidationError::MissingName),
    };

    Ok(NewPet {
        name,
        breed: fields.breed.as_deref().map(normalize_breed).unwrap_or_default(),
        gender: fields.gender.map(parse_gender).transpose()?.unwrap_or_default(),
        weight: fields.weight.map(parse_weight).transpose()?.unwrap_or(0),
    })
}

/// Validates a partial update payload.
///
/// Absent fields stay `None`; supplied fields follow insert rules.
pub fn validate_for_update(fields: &PetFields) -> Result<PetPatch, PetValidationError> {
    Ok(PetPatch {
        name: fields.name.as_deref().map(normalize_name).transpose()?,
        breed: fields.breed.as_deref().map(normalize_breed),
        gender: fields.gender.map(parse_gender).transpose()?,
        weight: fields.weight.map(parse_weight).transpose()?,
    })
}

fn normalize_name(value: &str) -> Result<String, PetValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PetValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

fn normalize_breed(value: &str) -> String {
    value.trim().to_string()
}

fn parse_gender(code: i64) -> Result<Gender, PetValidationError> {
    Gender::from_code(code).ok_or(PetValidationError::InvalidGender(code))
}

fn parse_weight(value: i64) -> Result<u32, PetValidationError> {
    if value < 0 {
        return Err(PetValidationError::NegativeWeight(value));
    }
    u32::try_from(value).map_err(|_| PetValidationError::WeightOutOfRange(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_fills_defaults() {
        let pet = validate_for_insert(&PetFields::new().name("Garfield")).unwrap();
        assert_eq!(pet.name, "Garfield");
        assert_eq!(pet.breed, "");
        assert_eq!(pet.gender, Gender::Unknown);
        assert_eq!(pet.weight, 0);
    }

    #[test]
    fn insert_trims_text_fields() {
        let fields = PetFields::new().name("  Toto ").breed(" Terrier\n");
        let pet = validate_for_insert(&fields).unwrap();
        assert_eq!(pet.name, "Toto");
        assert_eq!(pet.breed, "Terrier");
    }

    #[test]
    fn insert_rejects_missing_and_blank_names() {
        assert_eq!(
            validate_for_insert(&PetFields::new().weight(3)),
            Err(PetValidationError::MissingName)
        );
        assert_eq!(
            validate_for_insert(&PetFields::new().name("   ")),
            Err(PetValidationError::BlankName)
        );
    }

    #[test]
    fn insert_rejects_out_of_domain_values() {
        let negative = PetFields::new().name("Rex").weight(-1);
        assert_eq!(
            validate_for_insert(&negative),
            Err(PetValidationError::NegativeWeight(-1))
        );

        let huge = PetFields::new().name("Rex").weight(i64::from(u32::MAX) + 1);
        assert!(matches!(
            validate_for_insert(&huge),
            Err(PetValidationError::WeightOutOfRange(_))
        ));

        let gender = PetFields::new().name("Rex").gender_code(3);
        assert_eq!(
            validate_for_insert(&gender),
            Err(PetValidationError::InvalidGender(3))
        );
    }

    #[test]
    fn update_keeps_absent_fields_unset() {
        let patch = validate_for_update(&PetFields::new().weight(12)).unwrap();
        assert_eq!(
            patch,
            PetPatch {
                weight: Some(12),
                ..PetPatch::default()
            }
        );
        assert!(validate_for_update(&PetFields::new()).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_supplied_invalid_values() {
        assert_eq!(
            validate_for_update(&PetFields::new().name("")),
            Err(PetValidationError::BlankName)
        );
        assert_eq!(
            validate_for_update(&PetFields::new().gender_code(-1)),
            Err(PetValidationError::InvalidGender(-1))
        );
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let mut pet = Pet {
            id: 4,
            name: "Toto".to_string(),
            breed: "Terrier".to_string(),
            gender: Gender::Male,
            weight: 7,
        };
        let patch = PetPatch {
            breed: Some(String::new()),
            weight: Some(9),
            ..PetPatch::default()
        };
        patch.apply_to(&mut pet);
        assert_eq!(pet.name, "Toto");
        assert_eq!(pet.breed, "");
        assert_eq!(pet.gender, Gender::Male);
        assert_eq!(pet.weight, 9);
    }

    #[test]
    fn gender_codes_roundtrip_through_domain() {
        for gender in [Gender::Unknown, Gender::Male, Gender::Female] {
            assert_eq!(Gender::from_code(gender.code()), Some(gender));
        }
        assert_eq!(Gender::from_code(7), None);
    }
}
