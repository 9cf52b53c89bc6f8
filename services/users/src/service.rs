//! User service: record-store operations plus per-user photo handling

use std::{io, sync::Arc};
use tracing::{info, warn};

use crate::{
    error::{UserError, UserResult},
    models::{StoredPhoto, User, UserPayload},
    photos::PhotoStore,
    repositories::UserRepository,
};

/// Service layer for user business logic
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    photos: PhotoStore,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, photos: PhotoStore) -> Self {
        Self { repository, photos }
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    /// Create a new user; the store assigns the id
    pub async fn create_user(&self, payload: UserPayload) -> UserResult<User> {
        let user = self.repository.insert(payload).await?;
        info!(user_id = user.id, "Created user");
        Ok(user)
    }

    pub async fn get_all_users(&self) -> UserResult<Vec<User>> {
        self.repository.find_all().await
    }

    pub async fn get_user_by_id(&self, id: i64) -> UserResult<Option<User>> {
        self.repository.find_by_id(id).await
    }

    /// Replace all six editable fields of an existing user
    ///
    /// Returns `Ok(None)` when no user has this id; nothing is written then.
    pub async fn update_user(&self, id: i64, payload: UserPayload) -> UserResult<Option<User>> {
        let Some(mut user) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        user.apply_payload(payload);
        let saved = self.repository.save(&user).await?;

        info!(user_id = id, "Updated user");
        Ok(Some(saved))
    }

    /// Delete a user and its photo file; missing users are not an error
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        let existing = self.repository.find_by_id(id).await?;
        self.repository.delete_by_id(id).await?;

        if let Some(path) = existing.and_then(|user| user.path_to_photo) {
            match self.photos.remove(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    user_id = id,
                    file = %path,
                    "Failed to remove photo of deleted user: {}",
                    e
                ),
            }
        }

        Ok(())
    }

    /// Store a new photo for a user, replacing the previous file
    pub async fn attach_photo(
        &self,
        id: i64,
        bytes: &[u8],
        original_file_name: &str,
    ) -> UserResult<User> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::UserNotFound(id))?;

        let stored = self.photos.write(original_file_name, bytes).await?;

        if let Some(previous) = user.path_to_photo.take() {
            match self.photos.remove(&previous).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    if let Err(cleanup) = self.photos.remove(&stored).await {
                        warn!(
                            user_id = id,
                            file = %stored,
                            "Failed to discard new photo: {}",
                            cleanup
                        );
                    }
                    return Err(e.into());
                }
            }
        }

        user.path_to_photo = Some(stored);
        let saved = self.repository.save(&user).await?;

        info!(user_id = id, "Attached photo");
        Ok(saved)
    }

    /// Read the user's current photo
    pub async fn fetch_photo(&self, id: i64) -> UserResult<StoredPhoto> {
        let (_, path) = self.photo_path(id).await?;

        let bytes = self
            .photos
            .read(&path)
            .await
            .map_err(|e| photo_io_error(id, e))?;

        Ok(StoredPhoto {
            file_name: path,
            bytes,
        })
    }

    /// Delete the user's photo file and clear its path
    pub async fn detach_photo(&self, id: i64) -> UserResult<User> {
        let (mut user, path) = self.photo_path(id).await?;

        self.photos
            .remove(&path)
            .await
            .map_err(|e| photo_io_error(id, e))?;

        user.path_to_photo = None;
        let saved = self.repository.save(&user).await?;

        info!(user_id = id, "Detached photo");
        Ok(saved)
    }

    async fn photo_path(&self, id: i64) -> UserResult<(User, String)> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::UserNotFound(id))?;

        match user.path_to_photo.clone() {
            Some(path) => Ok((user, path)),
            None => Err(UserError::PhotoNotFound(id)),
        }
    }
}

/// A file that vanished from disk counts as a missing photo
fn photo_io_error(id: i64, err: io::Error) -> UserError {
    if err.kind() == io::ErrorKind::NotFound {
        UserError::PhotoNotFound(id)
    } else {
        UserError::Io(err)
    }
}
