use serde_json::json;
use sqlnest::prelude::*;

fn album_schema() -> Schema {
    Schema::from_json_str(
        r#"[
            {"type": "COLUMN", "name": "a", "column": "id", "isId": true},
            {"type": "COLUMN", "name": "b", "column": "name"},
            {"type": "ONE", "name": "artist", "properties": [
                {"type": "COLUMN", "name": "id", "column": "artist_id", "isId": true},
                {"type": "COLUMN", "name": "name", "column": "artist_name"}
            ]},
            {"type": "MANY", "name": "tracks", "properties": [
                {"type": "COLUMN", "name": "id", "column": "track_id", "isId": true},
                {"type": "COLUMN", "name": "title", "column": "track_title"}
            ]}
        ]"#,
    )
    .expect("parse album schema")
}

fn album_rows() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 2, "track_title": "Track 2"},
        {"id": 2, "name": "Album 2", "artist_id": 2, "artist_name": "Artist 2", "track_id": 3, "track_title": "Track 3"}
    ])
}

#[test]
fn album_rows_collapse_into_two_albums() {
    let albums = hydrate_json(&album_rows(), &album_schema()).expect("hydrate albums");

    assert_eq!(albums.len(), 2);
    assert_eq!(
        serde_json::to_string(&albums).unwrap(),
        concat!(
            r#"[{"a":1,"b":"Album 1","artist":{"id":1,"name":"Artist 1"},"#,
            r#""tracks":[{"id":1,"title":"Track 1"},{"id":2,"title":"Track 2"}]},"#,
            r#"{"a":2,"b":"Album 2","artist":{"id":2,"name":"Artist 2"},"#,
            r#""tracks":[{"id":3,"title":"Track 3"}]}]"#,
        )
    );
}

#[test]
fn typed_access_on_hydrated_album() {
    let albums = hydrate_json(&album_rows(), &album_schema()).unwrap();
    let first = &albums[0];

    assert_eq!(first.get_named::<i64>("a").unwrap(), 1);
    assert_eq!(first.get_named::<String>("b").unwrap(), "Album 1");

    let artist = first.get_object("artist").expect("artist object");
    assert_eq!(artist.get_named::<String>("name").unwrap(), "Artist 1");

    let titles: Vec<String> = first
        .get_list("tracks")
        .expect("tracks list")
        .iter()
        .map(|t| t.get_named::<String>("title").unwrap())
        .collect();
    assert_eq!(titles, vec!["Track 1", "Track 2"]);
}

#[test]
fn first_seen_order_with_interleaved_rows() {
    let rows = json!([
        {"id": 2, "name": "Album 2", "artist_id": 2, "artist_name": "Artist 2", "track_id": 3, "track_title": "Track 3"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 2, "track_title": "Track 2"},
        {"id": 2, "name": "Album 2", "artist_id": 2, "artist_name": "Artist 2", "track_id": 4, "track_title": "Track 4"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 2, "name": "Album 2", "artist_id": 2, "artist_name": "Artist 2", "track_id": 3, "track_title": "Track 3"}
    ]);

    let albums = hydrate_json(&rows, &album_schema()).unwrap();

    assert_eq!(
        serde_json::to_value(&albums).unwrap(),
        json!([
            {"a": 2, "b": "Album 2", "artist": {"id": 2, "name": "Artist 2"},
             "tracks": [{"id": 3, "title": "Track 3"}, {"id": 4, "title": "Track 4"}]},
            {"a": 1, "b": "Album 1", "artist": {"id": 1, "name": "Artist 1"},
             "tracks": [{"id": 2, "title": "Track 2"}, {"id": 1, "title": "Track 1"}]}
        ])
    );
}

#[test]
fn rows_without_top_level_identity_are_skipped() {
    let rows = json!([
        {"id": null, "name": "Orphan", "artist_id": 9, "artist_name": "Nobody", "track_id": 9, "track_title": "Lost"},
        {"name": "No id column", "track_id": 8},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"}
    ]);

    let albums = hydrate_json(&rows, &album_schema()).unwrap();

    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].get_value("a"), Some(&Value::BigInt(1)));
}

#[test]
fn empty_dataset_yields_no_entities() {
    assert!(hydrate_json(&json!([]), &album_schema()).unwrap().is_empty());
    assert!(hydrate(&[], &album_schema()).is_empty());
}

#[test]
fn value_columns_take_the_last_row() {
    let rows = json!([
        {"id": 1, "name": "Draft", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Demo"},
        {"id": 1, "name": "Final", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Master"}
    ]);

    let albums = hydrate_json(&rows, &album_schema()).unwrap();

    assert_eq!(
        serde_json::to_value(&albums).unwrap(),
        json!([{"a": 1, "b": "Final", "artist": {"id": 1, "name": "Artist 1"},
                "tracks": [{"id": 1, "title": "Master"}]}])
    );
}

#[test]
fn null_object_identity_nulls_the_field() {
    let rows = json!([
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 1, "name": "Album 1", "artist_id": null, "artist_name": null, "track_id": 2, "track_title": "Track 2"}
    ]);

    let albums = hydrate_json(&rows, &album_schema()).unwrap();

    assert!(albums[0].is_null("artist"));
    assert_eq!(albums[0].get_list("tracks").map(|t| t.len()), Some(2));
    assert_eq!(
        serde_json::to_value(&albums[0]).unwrap()["artist"],
        serde_json::Value::Null
    );
}

#[test]
fn object_is_replaced_not_merged() {
    let rows = json!([
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "track_id": 2, "track_title": "Track 2"},
        {"id": 1, "name": "Album 1", "artist_id": 7, "artist_name": "Guest", "track_id": 3, "track_title": "Track 3"}
    ]);

    let albums = hydrate_json(&rows, &album_schema()).unwrap();
    let artist = albums[0].get_object("artist").unwrap();

    assert_eq!(artist.get_value("id"), Some(&Value::BigInt(7)));
    assert_eq!(artist.get_value("name"), Some(&Value::from("Guest")));

    let rows = json!([
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "track_id": 2, "track_title": "Track 2"}
    ]);
    let albums = hydrate_json(&rows, &album_schema()).unwrap();
    assert_eq!(
        serde_json::to_value(albums[0].get_object("artist").unwrap()).unwrap(),
        json!({"id": 1, "name": null})
    );
}

#[test]
fn array_null_identity_resets_and_later_rows_revive() {
    let rows = json!([
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 2, "track_title": "Track 2"},
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": null, "track_title": null}
    ]);
    let albums = hydrate_json(&rows, &album_schema()).unwrap();
    assert_eq!(albums[0].get("tracks"), Some(&FieldValue::Null));

    let mut rows = rows;
    rows.as_array_mut().unwrap().push(json!(
        {"id": 1, "name": "Album 1", "artist_id": 1, "artist_name": "Artist 1", "track_id": 1, "track_title": "Track 1"}
    ));
    let albums = hydrate_json(&rows, &album_schema()).unwrap();
    assert_eq!(
        serde_json::to_value(&albums[0]).unwrap()["tracks"],
        json!([{"id": 1, "title": "Track 1"}])
    );
}

#[test]
fn hashed_lookup_gives_identical_output() {
    let mut data = Vec::new();
    for i in 0..60i64 {
        data.push(json!({
            "id": i % 7,
            "name": format!("Album {}", i % 7),
            "artist_id": i % 3,
            "artist_name": format!("Artist {}", i % 3),
            "track_id": if i % 11 == 0 { serde_json::Value::Null } else { json!(i % 5) },
            "track_title": format!("Track {}", i),
        }));
    }
    let rows = rows_from_json(&serde_json::Value::Array(data)).unwrap();
    let schema = album_schema();

    let scanned = Hydrator::new(&schema).hydrate(&rows);
    let hashed = Hydrator::with_config(&schema, HydrateConfig::new().hashed()).hydrate(&rows);

    assert_eq!(scanned.len(), 7);
    assert_eq!(scanned, hashed);
    assert_eq!(
        serde_json::to_string(&scanned).unwrap(),
        serde_json::to_string(&hashed).unwrap()
    );
}

#[test]
fn malformed_dataset_is_an_error() {
    let err = hydrate_json(&json!([{"id": 1}, 5]), &album_schema()).unwrap_err();
    assert!(!err.is_schema_error());

    assert!(hydrate_json(&json!([{"id": [1, 2]}]), &album_schema()).is_err());
}
