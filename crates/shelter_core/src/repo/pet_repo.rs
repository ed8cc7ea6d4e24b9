//! Pet repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide row-level CRUD over the `pets` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Callers pass payloads already normalized by `contract::pet`.
//! - Read paths reject persisted rows that violate the contract instead of
//!   masking them.
//! - A missing id yields `None` or an affected count of 0, never an error.

use crate::contract::pet::{Gender, NewPet, Pet, PetId, PetPatch};
use crate::db::DbError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PET_SELECT_SQL: &str = "SELECT
    _id,
    name,
    breed,
    gender,
    weight
FROM pets";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Simple filters for listing pets. The default lists everything by
/// ascending id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetListQuery {
    pub gender: Option<Gender>,
    pub limit: Option<u32>,
    pub offset: u32,
    /// Newest first when set.
    pub descending: bool,
}

impl PetListQuery {
    /// Whether a single record passes the row filters.
    ///
    /// Pagination does not apply to single records.
    pub fn matches(&self, pet: &Pet) -> bool {
        self.gender.map_or(true, |gender| pet.gender == gender)
    }
}

/// Repository interface for pet CRUD operations.
pub trait PetRepository {
    fn insert_pet(&self, pet: &NewPet) -> RepoResult<PetId>;
    fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>>;
    fn list_pets(&self, query: &PetListQuery) -> RepoResult<Vec<Pet>>;
    fn update_pet(&self, id: PetId, patch: &PetPatch) -> RepoResult<usize>;
    fn delete_pet(&self, id: PetId) -> RepoResult<usize>;
    fn delete_all_pets(&self) -> RepoResult<usize>;
    fn count_pets(&self) -> RepoResult<u64>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePetRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn insert_pet(&self, pet: &NewPet) -> RepoResult<PetId> {
        self.conn.execute(
            "INSERT INTO pets (name, breed, gender, weight) VALUES (?1, ?2, ?3, ?4);",
            params![
                pet.name.as_str(),
                pet.breed.as_str(),
                pet.gender.code(),
                pet.weight
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PET_SELECT_SQL} WHERE _id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_pet_row(row)?));
        }
        Ok(None)
    }

    fn list_pets(&self, query: &PetListQuery) -> RepoResult<Vec<Pet>> {
        let mut sql = format!("{PET_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(gender) = query.gender {
            sql.push_str(" AND gender = ?");
            bind_values.push(Value::Integer(gender.code()));
        }

        if query.descending {
            sql.push_str(" ORDER BY _id DESC");
        } else {
            sql.push_str(" ORDER BY _id ASC");
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pets = Vec::new();
        while let Some(row) = rows.next()? {
            pets.push(parse_pet_row(row)?);
        }
        Ok(pets)
    }

    fn update_pet(&self, id: PetId, patch: &PetPatch) -> RepoResult<usize> {
        if patch.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        let Some(mut pet) = self.get_pet(id)? else {
            return Ok(0);
        };
        patch.apply_to(&mut pet);

        let changed = tx.execute(
            "UPDATE pets
             SET
                name = ?1,
                breed = ?2,
                gender = ?3,
                weight = ?4
             WHERE _id = ?5;",
            params![
                pet.name.as_str(),
                pet.breed.as_str(),
                pet.gender.code(),
                pet.weight,
                id
            ],
        )?;
        tx.commit()?;
        Ok(changed)
    }

    fn delete_pet(&self, id: PetId) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM pets WHERE _id = ?1;", [id])?)
    }

    fn delete_all_pets(&self) -> RepoResult<usize> {
        Ok(self.conn.execute("DELETE FROM pets;", [])?)
    }

    fn count_pets(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM pets;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_pet_row(row: &Row<'_>) -> RepoResult<Pet> {
    let id: PetId = row.get("_id")?;

    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in pets.name for _id {id}"
        )));
    }

    let gender_code: i64 = row.get("gender")?;
    let gender = Gender::from_code(gender_code).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{gender_code}` in pets.gender for _id {id}"
        ))
    })?;

    let weight_value: i64 = row.get("weight")?;
    let weight = u32::try_from(weight_value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid weight `{weight_value}` in pets.weight for _id {id}"
        ))
    })?;

    Ok(Pet {
        id,
        name,
        breed: row.get::<_, Option<String>>("breed")?.unwrap_or_default(),
        gender,
        weight,
    })
}
