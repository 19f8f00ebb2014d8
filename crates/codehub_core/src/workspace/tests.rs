use super::*;
use crate::backend::Action;
use crate::test_support::{folder, submission, FlakyBackend};
use tempfile::TempDir;

const ADMIN: &str = "khush";

fn workspace_for(
    user: &str,
    submissions: Vec<Submission>,
    folders: Vec<Folder>,
) -> Workspace<FlakyBackend> {
    let state = LocalState {
        user_name: user.to_string(),
        ..LocalState::default()
    };
    Workspace::new(FlakyBackend::with_rows(submissions, folders), state, ADMIN)
}

fn file(name: &str, content: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content: content.to_string(),
    }
}

#[tokio::test]
async fn refresh_inserts_general_and_counts_files() {
    let mut ws = workspace_for(
        "ana",
        vec![
            submission("1", "general", "a.js", "ana"),
            submission("2", "tools", "b.sh", "ana"),
            submission("3", "tools", "c.sh", "bo"),
        ],
        vec![folder("tools", Privacy::Public, Some("ana"))],
    );
    ws.refresh().await.expect("refresh");

    assert_eq!(ws.folders()[0].id, GENERAL_FOLDER_ID);
    assert_eq!(ws.folder("tools").map(|f| f.file_count), Some(2));
    assert_eq!(ws.folder("general").map(|f| f.file_count), Some(1));
    assert_eq!(ws.state().folders.len(), 2);
    assert_eq!(ws.current_submissions().len(), 1);
}

#[tokio::test]
async fn submissions_in_unknown_folders_are_refiled() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "ghost", "a.js", "ana")],
        vec![],
    );
    ws.refresh().await.expect("refresh");
    assert_eq!(ws.store().get("1").map(|s| s.folder.as_str()), Some("general"));
}

#[tokio::test]
async fn submissions_keep_their_folder_until_folders_are_fetched() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "tools", "a.rs", "ana")],
        vec![folder("tools", Privacy::Public, Some("ana"))],
    );
    ws.load_submissions().await.expect("load");
    assert!(!ws.folders_loaded());
    assert_eq!(ws.store().get("1").map(|s| s.folder.as_str()), Some("tools"));

    let edit = SubmissionEdit {
        description: Some("only the description".to_string()),
        ..SubmissionEdit::default()
    };
    ws.update_submission("1", edit).await.expect("edit");
    let remote = ws.backend().inner.list_submissions().await.expect("list");
    assert_eq!(remote[0].folder, "tools");
    assert_eq!(remote[0].description, "only the description");
}

#[tokio::test]
async fn edits_of_refiled_submissions_keep_the_stored_folder() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "ghost", "a.rs", "ana")],
        vec![],
    );
    ws.refresh().await.expect("refresh");
    assert_eq!(ws.store().get("1").map(|s| s.folder.as_str()), Some("general"));

    let edit = SubmissionEdit {
        description: Some("touched".to_string()),
        ..SubmissionEdit::default()
    };
    ws.update_submission("1", edit).await.expect("edit");
    let remote = ws.backend().inner.list_submissions().await.expect("list");
    assert_eq!(remote[0].folder, "ghost");
    assert_eq!(ws.store().get("1").map(|s| s.folder.as_str()), Some("general"));
}

#[tokio::test]
async fn sign_in_survives_failed_registration() {
    let mut ws = workspace_for("", vec![], vec![]);
    ws.backend().fail(Action::RegisterUser);

    ws.sign_in("  KHUSH ").await.expect("sign in");
    assert_eq!(ws.session().user_name(), "KHUSH");
    assert!(ws.session().is_admin());
    assert_eq!(ws.state().user_name, "KHUSH");
    assert!(ws.backend().inner.users().is_empty());

    assert!(ws.sign_in("   ").await.is_err());
}

#[tokio::test]
async fn hidden_folder_switch_is_rejected() {
    let mut ws = workspace_for(
        "ana",
        vec![],
        vec![
            folder("secret", Privacy::Private, Some("zed")),
            folder("shared", Privacy::Public, Some("zed")),
        ],
    );
    ws.refresh().await.expect("refresh");

    let err = ws.switch_folder("secret").expect_err("private folder");
    assert!(matches!(err, AppError::PermissionDenied(_)));
    assert_eq!(ws.session().current_folder(), GENERAL_FOLDER_ID);
    assert!(matches!(ws.switch_folder("nope"), Err(AppError::NotFound)));

    ws.switch_folder("shared").expect("public folder");
    assert_eq!(ws.session().current_folder(), "shared");
    assert_eq!(ws.state().current_folder, "shared");
    assert_eq!(ws.activity(1)[0].action, "Switched to folder: SHARED");
    assert_eq!(ws.visible_folders().len(), 2);
}

#[tokio::test]
async fn deleting_current_folder_moves_files_and_session_to_general() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "tools", "a.rs", "ana")],
        vec![folder("tools", Privacy::Private, Some("ana"))],
    );
    ws.refresh().await.expect("refresh");
    ws.switch_folder("tools").expect("switch");

    ws.delete_folder("tools").await.expect("delete");
    assert_eq!(ws.session().current_folder(), GENERAL_FOLDER_ID);
    assert!(ws.folder("tools").is_none());
    let ids: Vec<&str> = ws
        .current_submissions()
        .iter()
        .map(|s| s.submission_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1"]);

    let actions: Vec<&str> = ws.activity(2).iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["Deleted folder: TOOLS", "Switched to folder: General"]
    );
}

#[tokio::test]
async fn folder_delete_succeeds_when_reload_fails() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "tools", "a.rs", "ana")],
        vec![folder("tools", Privacy::Private, Some("ana"))],
    );
    ws.refresh().await.expect("refresh");
    ws.switch_folder("tools").expect("switch");
    ws.backend().fail(Action::GetFolders);

    ws.delete_folder("tools").await.expect("delete confirmed");
    assert_eq!(ws.session().current_folder(), GENERAL_FOLDER_ID);
    assert_eq!(ws.state().current_folder, GENERAL_FOLDER_ID);
    let remote = ws.backend().inner.list_folders().await.expect("folders");
    assert!(remote.iter().all(|f| f.id != "tools"));
    assert_eq!(ws.activity(1)[0].action, "Deleted folder: TOOLS");
}

#[tokio::test]
async fn folder_delete_requires_ownership() {
    let mut ws = workspace_for(
        "ana",
        vec![],
        vec![folder("tools", Privacy::Public, Some("zed"))],
    );
    ws.refresh().await.expect("refresh");

    let err = ws.delete_folder("tools").await.expect_err("not owner");
    assert!(matches!(err, AppError::PermissionDenied(_)));
    let err = ws.delete_folder("general").await.expect_err("general");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(ws.folder("tools").is_some());
}

#[tokio::test]
async fn create_folder_reloads_list() {
    let mut ws = workspace_for("ana", vec![], vec![]);
    assert!(ws.create_folder("  ", Privacy::Public).await.is_err());

    let id = ws
        .create_folder("Scripts", Privacy::Public)
        .await
        .expect("create")
        .expect("id");
    let created = ws.folder(&id).expect("listed");
    assert_eq!(created.owner.as_deref(), Some("ana"));
    assert_eq!(ws.activity(1)[0].action, "Created public folder: Scripts");
}

#[tokio::test]
async fn upload_applies_defaults() {
    let mut ws = workspace_for("", vec![], vec![]);
    let ids = ws
        .upload(
            vec![file("main.rs", "fn main() {}\n"), file("Makefile", "all:\n")],
            UploadOptions::default(),
        )
        .await
        .expect("upload");
    assert_eq!(ids.len(), 2);

    let stored = ws.current_submissions();
    assert_eq!(stored.len(), 2);
    let main = stored.iter().find(|s| s.file_name == "main.rs").expect("main");
    assert_eq!(main.file_type, "rs");
    assert_eq!(main.description, UPLOAD_DEFAULT_DESCRIPTION);
    assert_eq!(main.uploaded_by, "Anonymous");
    assert_eq!(main.file_size, 13);
    assert_eq!(main.expiration.as_deref(), Some("never"));
    let make = stored.iter().find(|s| s.file_name == "Makefile").expect("make");
    assert_eq!(make.file_type, "Makefile");
    assert_eq!(ws.activity(1)[0].action, "Uploaded 2 file(s)");
}

#[tokio::test]
async fn upload_rejects_empty_batch_and_hidden_folders() {
    let mut ws = workspace_for(
        "ana",
        vec![],
        vec![folder("secret", Privacy::Private, Some("zed"))],
    );
    ws.refresh().await.expect("refresh");

    let err = ws
        .upload(Vec::new(), UploadOptions::default())
        .await
        .expect_err("empty");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(!err.is_endpoint_failure());

    let options = UploadOptions {
        folder: Some("secret".to_string()),
        ..UploadOptions::default()
    };
    let err = ws
        .upload(vec![file("a.txt", "x")], options)
        .await
        .expect_err("hidden");
    assert!(matches!(err, AppError::PermissionDenied(_)));
    assert!(ws.store().is_empty());
}

#[tokio::test]
async fn editor_validates_name_and_content() {
    let mut ws = workspace_for("ana", vec![], vec![]);
    let blank_name = EditorDraft {
        file_name: " ".to_string(),
        code_content: "x".to_string(),
        ..EditorDraft::default()
    };
    assert!(ws.create_from_editor(blank_name).await.is_err());
    let blank_body = EditorDraft {
        file_name: "a.py".to_string(),
        code_content: " \n\t".to_string(),
        ..EditorDraft::default()
    };
    assert!(ws.create_from_editor(blank_body).await.is_err());

    let draft = EditorDraft {
        file_name: "a.py".to_string(),
        code_content: "print(1)".to_string(),
        ..EditorDraft::default()
    };
    ws.create_from_editor(draft).await.expect("create");
    let stored = ws.current_submissions();
    assert_eq!(stored[0].description, EDITOR_DEFAULT_DESCRIPTION);
    assert_eq!(stored[0].uploaded_by, "ana");
}

#[tokio::test]
async fn update_checks_permission_and_stamps_editor() {
    let mut ws = workspace_for(
        "bo",
        vec![submission("1", "general", "a.js", "ana")],
        vec![],
    );
    ws.refresh().await.expect("refresh");
    let edit = SubmissionEdit {
        file_name: Some("a.ts".to_string()),
        ..SubmissionEdit::default()
    };
    let err = ws
        .update_submission("1", edit.clone())
        .await
        .expect_err("not owner");
    assert!(matches!(err, AppError::PermissionDenied(_)));

    ws.sign_in(ADMIN).await.expect("admin");
    ws.update_submission("1", edit).await.expect("admin edit");
    let updated = ws.store().get("1").expect("updated");
    assert_eq!(updated.file_name, "a.ts");
    assert_eq!(updated.file_type, "ts");
    assert_eq!(updated.modified_by.as_deref(), Some(ADMIN));
    assert!(updated.last_modified.is_some());
    assert_eq!(updated.uploaded_by, "ana");

    let blank = SubmissionEdit {
        code_content: Some("   ".to_string()),
        ..SubmissionEdit::default()
    };
    assert!(ws.update_submission("1", blank).await.is_err());
    assert!(matches!(
        ws.update_submission("missing", SubmissionEdit::default()).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn bulk_delete_continues_after_failures() {
    let mut ws = workspace_for(
        "ana",
        vec![
            submission("1", "general", "a.js", "ana"),
            submission("2", "general", "b.js", "ana"),
            submission("3", "general", "c.js", "bo"),
            submission("4", "general", "d.js", "ana"),
        ],
        vec![],
    );
    ws.refresh().await.expect("refresh");
    ws.backend().fail_id("2");
    ws.toggle_star("1").expect("star");

    let ids: Vec<String> = ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect();
    let report = ws.bulk_delete(&ids).await.expect("bulk");
    assert_eq!(report.deleted, vec!["1", "4"]);
    let failed: Vec<&str> = report.failed.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(failed, vec!["2", "3"]);
    assert!(!report.is_complete());

    let remaining: Vec<&str> = ws
        .current_submissions()
        .iter()
        .map(|s| s.submission_id.as_str())
        .collect();
    assert_eq!(remaining, vec!["2", "3"]);
    assert!(!ws.is_starred("1"));

    assert!(ws.bulk_delete(&[]).await.is_err());
}

#[tokio::test]
async fn export_requires_files_in_current_folder() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "tools", "a.js", "ana")],
        vec![folder("tools", Privacy::Public, None)],
    );
    ws.refresh().await.expect("refresh");
    assert!(ws.export_current_folder().is_err());

    ws.switch_folder("tools").expect("switch");
    let files = ws.export_current_folder().expect("export");
    assert_eq!(files.len(), 1);
    assert_eq!(ws.activity(1)[0].action, "Exported 1 files");
}

#[tokio::test]
async fn failed_refresh_keeps_cached_view() {
    let mut ws = workspace_for(
        "ana",
        vec![submission("1", "general", "a.js", "ana")],
        vec![],
    );
    ws.refresh().await.expect("refresh");
    ws.backend().fail(Action::GetSubmissions);
    assert!(ws.refresh().await.is_err());
    assert_eq!(ws.current_submissions().len(), 1);

    ws.backend().heal(Action::GetSubmissions);
    ws.refresh().await.expect("healed");
}

#[tokio::test]
async fn projects_act_as_folders_and_persist() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("state.json");

    let mut ws = Workspace::open(FlakyBackend::default(), &path, ADMIN).expect("open");
    ws.sign_in("ana").await.expect("sign in");
    let project = ws.create_project("Site", "landing page").expect("project");
    ws.switch_project(&project.id).expect("switch");
    assert_eq!(ws.folder_name(&project.id), "Site");
    ws.upload(vec![file("index.html", "<p>")], UploadOptions::default())
        .await
        .expect("upload");
    ws.refresh().await.expect("refresh");
    assert_eq!(ws.current_submissions().len(), 1);
    ws.post_chat_message("general", "hello").expect("chat");
    ws.set_dark_mode(true).expect("theme");
    assert_eq!(ws.analytics().active_projects, 1);

    let reopened = Workspace::open(FlakyBackend::default(), &path, ADMIN).expect("reopen");
    assert_eq!(reopened.session().user_name(), "ana");
    assert_eq!(reopened.session().current_folder(), project.id);
    assert_eq!(reopened.projects().len(), 1);
    assert_eq!(reopened.chat("general").len(), 1);
    assert!(reopened.state().dark_mode);
    assert!(matches!(ws.switch_project("project_0"), Err(AppError::NotFound)));
}
