use super::*;
use crate::backend::Action;
use crate::test_support::{at, submission, FlakyBackend};

fn sample_store() -> SubmissionStore {
    let mut tagged = submission("3", "general", "notes.md", "bo");
    tagged.tags = vec!["Release".to_string(), "docs".to_string()];
    tagged.description = "Changelog draft".to_string();
    tagged.timestamp = Some(at(30));

    let mut late = submission("4", "general", "main.rs", "ana");
    late.timestamp = Some(at(45));

    SubmissionStore::from_submissions(vec![
        submission("1", "general", "a.js", "ana"),
        submission("2", "proj", "b.py", "bo"),
        tagged,
        late,
    ])
}

fn ids(items: &[&Submission]) -> Vec<String> {
    items.iter().map(|s| s.submission_id.clone()).collect()
}

#[test]
fn folder_filter_excludes_other_folders() {
    let store = SubmissionStore::from_submissions(vec![
        submission("1", "general", "a.js", "ana"),
        submission("2", "proj", "b.py", "ana"),
    ]);
    let visible = store.filter(&FilterQuery::folder("general"));
    assert_eq!(ids(&visible), vec!["1"]);
}

#[test]
fn filter_is_a_subset_and_idempotent() {
    let store = sample_store();
    let query = FilterQuery::folder("general").with_search(Some("a".to_string()));

    let once = store.filter(&query);
    assert!(once.iter().all(|s| store.get(&s.submission_id).is_some()));
    assert!(once.len() <= store.len());

    let twice = query.apply(once.iter().copied());
    assert_eq!(ids(&once), ids(&twice));
}

#[test]
fn search_is_case_insensitive_across_fields_and_tags() {
    let store = sample_store();
    assert_eq!(ids(&store.filter_by("general", Some("RELEASE"), None)), vec!["3"]);
    assert_eq!(ids(&store.filter_by("general", Some("changelog"), None)), vec!["3"]);
    assert_eq!(ids(&store.filter_by("general", Some("MAIN.RS"), None)), vec!["4"]);
    assert_eq!(ids(&store.filter_by("general", Some("bo"), None)), vec!["3"]);
    assert!(store.filter_by("general", Some("b.py"), None).is_empty());
}

#[test]
fn blank_search_and_type_match_everything_in_folder() {
    let store = sample_store();
    let all = store.filter_by("general", Some("   "), Some(""));
    assert_eq!(ids(&all), vec!["1", "3", "4"]);
}

#[test]
fn file_type_filter_is_exact_and_case_insensitive() {
    let store = sample_store();
    assert_eq!(ids(&store.filter_by("general", None, Some("JS"))), vec!["1"]);
    assert!(store.filter_by("general", None, Some("j")).is_empty());
    assert_eq!(
        ids(&store.filter_by("general", Some("ana"), Some("rs"))),
        vec!["4"]
    );
}

#[test]
fn starred_view_is_limited_to_the_folder() {
    let store = sample_store();
    let mut starred = StarredFiles::default();
    starred.toggle("2");
    starred.toggle("3");
    assert_eq!(ids(&store.starred("general", &starred)), vec!["3"]);
    assert_eq!(ids(&store.starred("proj", &starred)), vec!["2"]);
}

#[test]
fn recent_view_sorts_newest_first_and_truncates() {
    let store = sample_store();
    assert_eq!(ids(&store.recent("general", 2)), vec!["4", "3"]);
    assert_eq!(store.recent("general", 10).len(), 3);
    assert!(store.recent("missing", 10).is_empty());
}

#[test]
fn recent_view_puts_undated_rows_last() {
    let mut undated = submission("9", "general", "old.txt", "ana");
    undated.timestamp = None;
    let mut dated = submission("8", "general", "new.txt", "ana");
    dated.timestamp = Some(at(5));
    let store = SubmissionStore::from_submissions(vec![
        undated,
        dated,
        submission("7", "general", "mid.txt", "bo"),
    ]);
    assert_eq!(ids(&store.recent("general", 10)), vec!["8", "7", "9"]);
}

#[test]
fn folder_stats_sum_counts_and_sizes() {
    let store = sample_store();
    let stats = store.folder_stats();
    let general = stats.get("general").expect("general stats");
    assert_eq!(general.file_count, 3);
    let expected: u64 = store
        .all()
        .iter()
        .filter(|s| s.folder == "general")
        .map(|s| s.file_size)
        .sum();
    assert_eq!(general.total_size, expected);
    assert_eq!(stats.get("proj").map(|s| s.file_count), Some(1));
}

#[test]
fn analytics_counts_distinct_uploaders_and_types() {
    let store = sample_store();
    let analytics = store.analytics(2);
    assert_eq!(analytics.total_files, 4);
    assert_eq!(analytics.collaborators, 2);
    assert_eq!(analytics.file_types, 4);
    assert_eq!(analytics.active_projects, 2);
    assert_eq!(analytics.total_lines, 8);
    assert!(analytics.storage_mib() > 0.0);
}

#[test]
fn orphans_move_to_general() {
    let mut store = sample_store();
    let known: HashSet<&str> = HashSet::from(["other"]);
    assert_eq!(store.reassign_orphans(&known), 1);
    assert!(store.all().iter().all(|s| s.folder == GENERAL_FOLDER_ID));

    let known: HashSet<&str> = HashSet::new();
    assert_eq!(store.reassign_orphans(&known), 0);
}

#[test]
fn refiled_rows_keep_their_stored_folder() {
    let mut store = sample_store();
    store.reassign_orphans(&HashSet::new());
    assert_eq!(store.get("2").map(|s| s.folder.as_str()), Some(GENERAL_FOLDER_ID));
    assert_eq!(store.stored_folder("2"), Some("proj"));
    assert_eq!(store.stored_folder("1"), Some(GENERAL_FOLDER_ID));
    assert_eq!(store.stored_folder("missing"), None);

    store.replace(vec![submission("2", "proj", "b.py", "bo")]);
    assert_eq!(store.stored_folder("2"), Some("proj"));
    assert_eq!(store.get("2").map(|s| s.folder.as_str()), Some("proj"));
}

#[tokio::test]
async fn load_replaces_cache() {
    let backend = FlakyBackend::with_rows(vec![submission("9", "general", "z.c", "ana")], vec![]);
    let mut store = sample_store();
    assert_eq!(store.load(&backend).await.expect("load"), 1);
    assert_eq!(ids(&store.filter(&FilterQuery::folder("general"))), vec!["9"]);
}

#[tokio::test]
async fn failed_load_keeps_previous_contents() {
    let backend = FlakyBackend::with_rows(vec![], vec![]);
    backend.fail(Action::GetSubmissions);
    let mut store = sample_store();
    let before = store.all().to_vec();
    let loaded_at = store.loaded_at();

    assert!(store.load(&backend).await.is_err());
    assert_eq!(store.all(), before.as_slice());
    assert_eq!(store.loaded_at(), loaded_at);
}
