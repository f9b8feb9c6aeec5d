//! Playlist Tests
//!
//! M3U parsing, Xtream list normalization, group ranking and export.

use serde_json::json;
use streamcascade::models::{ApiCategory, ApiStream, Channel};
use streamcascade::playlist::export::try_export;
use streamcascade::playlist::{
    export_to_file, parse_api_json, parse_api_lists, parse_text, to_m3u, DirectorySaver,
    ExportError, FileSaver, GroupRanker,
};

/// Keeps every saved payload in memory
#[derive(Default)]
struct RecordingSaver {
    saved: Vec<(String, String)>,
    fail: bool,
}

impl FileSaver for RecordingSaver {
    fn save(&mut self, payload: &str, filename: &str) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::Io {
                path: filename.into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.saved.push((payload.to_string(), filename.to_string()));
        Ok(())
    }
}

// =============================================================================
// M3U Parsing
// =============================================================================

#[test]
fn test_parse_single_entry() {
    let result = parse_text("#EXTINF:-1 group-title=\"news\",CNN\nhttp://a/1.ts");

    assert_eq!(result.channels, vec![Channel::new("CNN", "NEWS", "http://a/1.ts")]);
    assert_eq!(result.group_map.len(), 1);
    assert_eq!(result.channels_in("NEWS").len(), 1);
}

#[test]
fn test_parse_defaults_without_metadata() {
    let result = parse_text("#EXTINF:-1\nhttp://a/1.ts");

    assert_eq!(
        result.channels,
        vec![Channel::new("CHANNEL", "GENERAL", "http://a/1.ts")]
    );
}

#[test]
fn test_parse_metadata_carries_forward() {
    let text = "#EXTM3U\n\
                #EXTINF:-1 group-title=\"Spor\",Kanal A\n\
                http://a/1.ts\n\
                http://a/2.ts\n";
    let result = parse_text(text);

    assert_eq!(result.len(), 2);
    assert_eq!(result.channels[1], Channel::new("Kanal A", "SPOR", "http://a/2.ts"));
}

#[test]
fn test_parse_bare_url_uses_defaults() {
    let result = parse_text("HTTPS://cdn.example/live.m3u8");

    assert_eq!(
        result.channels,
        vec![Channel::new("CHANNEL", "GENERAL", "HTTPS://cdn.example/live.m3u8")]
    );
}

#[test]
fn test_parse_ignores_noise() {
    let text = "#EXTM3U\n\
                # comment\n\
                \n\
                rtmp://not/supported\n\
                #EXTINF:-1 tvg-id=\"x\" GROUP-TITLE=\"Film\",Name, with comma\n\
                   http://a/film.ts   \n";
    let result = parse_text(text);

    assert_eq!(
        result.channels,
        vec![Channel::new("with comma", "FILM", "http://a/film.ts")]
    );
}

#[test]
fn test_parse_empty_input() {
    let result = parse_text("");
    assert!(result.is_empty());
    assert!(result.group_map.is_empty());
}

#[test]
fn test_group_map_matches_channels() {
    let text = "#EXTINF:-1 group-title=\"a\",1\nhttp://x/1\n\
                #EXTINF:-1 group-title=\"b\",2\nhttp://x/2\n\
                #EXTINF:-1 group-title=\"A\",3\nhttp://x/3\n";
    let result = parse_text(text);

    let total: usize = result.group_map.values().map(Vec::len).sum();
    assert_eq!(total, result.channels.len());
    assert_eq!(result.group_counts().get("A"), Some(&2));
    assert_eq!(result.group_counts().get("B"), Some(&1));
    assert_eq!(
        result.channels_in("A").iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["1", "3"]
    );
}

// =============================================================================
// Xtream Lists
// =============================================================================

#[test]
fn test_api_lists_build_urls() {
    let streams = vec![ApiStream {
        stream_id: "7".into(),
        name: Some("Kanal 7".into()),
        category_id: Some("1".into()),
    }];
    let categories = vec![ApiCategory {
        category_id: "1".into(),
        category_name: "Ulusal".into(),
    }];

    let result = parse_api_lists(&streams, &categories, "http://s:8080", "u", "p");

    assert_eq!(
        result.channels,
        vec![Channel::new("Kanal 7", "Ulusal", "http://s:8080/live/u/p/7.ts")]
    );
}

#[test]
fn test_api_json_unknown_category_and_numeric_ids() {
    let streams = json!([
        { "stream_id": 9, "name": "X", "category_id": "99" },
        { "stream_id": "10", "name": "Y" },
        { "name": "missing id" }
    ]);
    let categories = json!([{ "category_id": 1, "category_name": "News" }]);

    let result = parse_api_json(&streams, &categories, "http://s/", "u", "p");

    assert_eq!(
        result.channels,
        vec![
            Channel::new("X", "OTHER", "http://s/live/u/p/9.ts"),
            Channel::new("Y", "OTHER", "http://s/live/u/p/10.ts"),
        ]
    );
}

#[test]
fn test_api_json_non_arrays_are_empty() {
    let result = parse_api_json(
        &json!({ "user_info": { "auth": 0 } }),
        &json!(null),
        "http://s",
        "u",
        "p",
    );
    assert!(result.is_empty());
}

// =============================================================================
// Group Ranking
// =============================================================================

#[test]
fn test_ranked_groups_first() {
    let text = "#EXTINF:-1 group-title=\"zebra\",1\nhttp://x/1\n\
                #EXTINF:-1 group-title=\"tr spor\",2\nhttp://x/2\n\
                #EXTINF:-1 group-title=\"ulusal haber\",3\nhttp://x/3\n";
    let result = parse_text(text);

    assert_eq!(
        GroupRanker::default().sort_groups(&result.group_map),
        vec!["ULUSAL HABER", "TR SPOR", "ZEBRA"]
    );
}

#[test]
fn test_unranked_groups_alphabetical() {
    let ranker = GroupRanker::new(["NEWS"]);
    assert_eq!(
        ranker.sort_names(["MOVIES", "ÉCOLE", "DOCS", "WORLD NEWS"]),
        vec!["WORLD NEWS", "DOCS", "ÉCOLE", "MOVIES"]
    );
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_export_round_trip() {
    let channels = vec![
        Channel::new("Kanal A", "SPOR", "http://a/1.ts"),
        Channel::new("Kanal B", "HABER", "http://a/2.m3u8"),
    ];
    let mut saver = RecordingSaver::default();

    assert!(export_to_file(&channels, "mine.m3u", &mut saver));
    assert_eq!(saver.saved.len(), 1);

    let (payload, filename) = &saver.saved[0];
    assert_eq!(filename, "mine.m3u");
    assert!(payload.starts_with("#EXTM3U\n"));
    assert_eq!(parse_text(payload).channels, channels);
}

#[test]
fn test_export_empty_selection() {
    let mut saver = RecordingSaver::default();

    assert!(!export_to_file(&[], "x.m3u", &mut saver));
    assert!(saver.saved.is_empty());
    assert!(matches!(
        try_export(&[], "x.m3u", &mut saver),
        Err(ExportError::Empty)
    ));
}

#[test]
fn test_export_save_failure() {
    let channels = vec![Channel::new("A", "B", "http://a/1.ts")];
    let mut saver = RecordingSaver {
        fail: true,
        ..RecordingSaver::default()
    };

    assert!(!export_to_file(&channels, "x.m3u", &mut saver));
}

#[test]
fn test_directory_saver_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let channels = vec![Channel::new("A", "NEWS", "http://a/1.ts")];
    let mut saver = DirectorySaver::new(dir.path().join("exports"));

    assert!(export_to_file(&channels, "news.m3u", &mut saver));

    let written = std::fs::read_to_string(dir.path().join("exports").join("news.m3u")).unwrap();
    assert_eq!(written, to_m3u(&channels));
}
