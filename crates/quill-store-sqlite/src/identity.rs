//! Account profiles and the built-in identity provider.
//!
//! Passwords are hashed with argon2 on the blocking pool; only the PHC string
//! is stored.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use quill_core::{
  account::{Account, Identity, NewAccount},
  store::{AccountStore, IdentityProvider},
};

use crate::{
  Error, Result,
  encode::{RawAccount, RawIdentity, encode_dt, encode_uuid, storable_dt},
  store::SqliteStore,
};

// ─── Password hashing ────────────────────────────────────────────────────────

fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn password_matches(password: &str, phc: &str) -> Result<bool> {
  let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
  Ok(
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
  )
}

impl SqliteStore {
  async fn account_where(&self, column: &'static str, value: String) -> Result<Option<Account>> {
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM accounts WHERE {column} = ?1", RawAccount::COLUMNS),
              rusqlite::params![value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
    self.account_where("email", email.to_owned()).await
  }

  async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
    self.account_where("username", username.to_owned()).await
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
    self.account_where("id", encode_uuid(id)).await
  }

  async fn insert_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      id:         input.id,
      email:      input.email,
      username:   input.username,
      name:       input.name,
      created_at: storable_dt(Utc::now()),
    };

    let id_str   = encode_uuid(account.id);
    let email    = account.email.clone();
    let username = account.username.clone();
    let name     = account.name.clone();
    let at_str   = encode_dt(account.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (id, email, username, name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, username, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }
}

// ─── IdentityProvider impl ───────────────────────────────────────────────────

impl IdentityProvider for SqliteStore {
  type Error = Error;

  async fn create_identity(&self, email: &str, password: &str) -> Result<Identity> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

    let identity = Identity {
      identity_id: Uuid::new_v4(),
      email:       email.to_owned(),
      created_at:  storable_dt(Utc::now()),
    };

    let id_str    = encode_uuid(identity.identity_id);
    let email_str = identity.email.clone();
    let at_str    = encode_dt(identity.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO identities (identity_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_str, hash, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from);

    match inserted {
      Ok(()) => {
        tracing::debug!(identity_id = %identity.identity_id, "identity created");
        Ok(identity)
      }
      Err(e) if e.is_constraint_violation() => Err(Error::IdentityExists(identity.email)),
      Err(e) => Err(e),
    }
  }

  async fn delete_identity(&self, identity_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(identity_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM identities WHERE identity_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    tracing::debug!(%identity_id, removed, "identity deleted");
    Ok(())
  }

  async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<Identity>> {
    let email_str = email.to_owned();

    let raw: Option<RawIdentity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT identity_id, email, password_hash, created_at
               FROM identities WHERE email = ?1",
              rusqlite::params![email_str],
              |row| {
                Ok(RawIdentity {
                  identity_id:   row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };

    let password = password.to_owned();
    let phc = raw.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || password_matches(&password, &phc)).await??;

    if matches {
      raw.into_identity().map(Some)
    } else {
      Ok(None)
    }
  }
}
