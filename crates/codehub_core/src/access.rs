//! Client-side permission rules.
//!
//! These checks gate what the client offers and sends. The endpoint does not
//! enforce them, so they are advisory rather than a security boundary.

use crate::{
    constants::GENERAL_FOLDER_ID,
    models::{Folder, Privacy, Submission},
    AppError, Session,
};

/// Whether `user` (or any admin) may edit or delete `submission`.
pub fn can_edit_as(submission: &Submission, user: &str, is_admin: bool) -> bool {
    is_admin || submission.uploaded_by == user
}

/// [`can_edit_as`] for the session's user and role.
pub fn can_edit(submission: &Submission, session: &Session) -> bool {
    can_edit_as(submission, session.user_name(), session.is_admin())
}

/// Reject an edit of someone else's file.
///
/// # Errors
/// Returns [`AppError::PermissionDenied`] when the session may not edit it.
pub fn ensure_can_edit(submission: &Submission, session: &Session) -> Result<(), AppError> {
    if can_edit(submission, session) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "You can only edit your own files".to_string(),
        ))
    }
}

/// Reject a delete of someone else's file.
///
/// # Errors
/// Returns [`AppError::PermissionDenied`] when the session may not delete it.
pub fn ensure_can_delete(submission: &Submission, session: &Session) -> Result<(), AppError> {
    if can_edit(submission, session) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "You can only delete your own files".to_string(),
        ))
    }
}

fn is_owner(folder: &Folder, session: &Session) -> bool {
    session.is_signed_in() && folder.owner.as_deref() == Some(session.user_name())
}

/// Whether the folder is selectable for this session.
pub fn can_view_folder(folder: &Folder, session: &Session) -> bool {
    folder.privacy == Privacy::Public
        || is_owner(folder, session)
        || session.is_admin()
        || folder.id == GENERAL_FOLDER_ID
}

/// The selectable subset of `folders`, in their original order.
pub fn visible_folders<'a>(folders: &'a [Folder], session: &Session) -> Vec<&'a Folder> {
    folders
        .iter()
        .filter(|folder| can_view_folder(folder, session))
        .collect()
}

/// Whether the session may delete the folder.
pub fn can_manage_folder(folder: &Folder, session: &Session) -> bool {
    !folder.is_general() && (session.is_admin() || is_owner(folder, session))
}

/// Reject switching into a folder the session cannot see.
///
/// # Errors
/// Returns [`AppError::PermissionDenied`] for hidden private folders.
pub fn ensure_can_switch(folder: &Folder, session: &Session) -> Result<(), AppError> {
    if can_view_folder(folder, session) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(
            "You do not have access to this folder".to_string(),
        ))
    }
}

/// Reject deleting `general` or a folder owned by someone else.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for `general` and
/// [`AppError::PermissionDenied`] for folders the session does not own.
pub fn ensure_can_delete_folder(folder: &Folder, session: &Session) -> Result<(), AppError> {
    if folder.is_general() {
        return Err(AppError::BadRequest(
            "Cannot delete the General folder.".to_string(),
        ));
    }
    if !can_manage_folder(folder, session) {
        return Err(AppError::PermissionDenied(
            "You can only delete folders you created.".to_string(),
        ));
    }
    Ok(())
}
