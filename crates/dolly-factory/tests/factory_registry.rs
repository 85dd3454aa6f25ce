use std::rc::Rc;

use dolly_core::{Blackhole, Error, Fields, Record, RecordingStorage, Value};
use dolly_factory::{Factory, Hook, Options, Sequence};

fn factory() -> Factory<RecordingStorage> {
    Factory::with_storage(RecordingStorage::new())
}

fn text(record: &Record, name: &str) -> String {
    record
        .value(name)
        .unwrap_or_else(|err| panic!("missing {name}: {err}"))
        .to_string()
}

#[test]
fn define_defines_blueprint_with_fields() {
    let mut factory = factory();
    factory
        .define(
            "player",
            Options::new()
                .field("username", "Test")
                .field("email", "test@example.com")
                .field("password", "123456"),
        )
        .expect("define");

    let player = factory.create("player", Fields::new()).expect("create");

    assert_eq!(text(&player, "username"), "Test");
    assert_eq!(text(&player, "email"), "test@example.com");
    assert_eq!(text(&player, "password"), "123456");
}

#[test]
fn sequences_advance_across_creates() {
    let mut factory = factory();
    factory
        .define(
            "player",
            Options::new()
                .field("username", "Test")
                .sequence("email", Sequence::new(|n| format!("test{n}@example.com"))),
        )
        .expect("define");

    let first = factory.create("player", Fields::new()).expect("create");
    let second = factory.create("player", Fields::new()).expect("create");

    assert_eq!(text(&first, "email"), "test1@example.com");
    assert_eq!(text(&second, "email"), "test2@example.com");
}

#[test]
fn define_rejects_duplicate_names() {
    let mut factory = factory();
    factory.define("player", Options::new()).expect("first define");

    let err = factory.define("player", Options::new()).unwrap_err();

    assert!(matches!(err, Error::DuplicateDefinition(ref name) if name == "player"));
}

#[test]
fn create_rejects_unregistered_names() {
    let mut factory = factory();

    let err = factory.create("ghost", Fields::new()).unwrap_err();

    assert!(matches!(err, Error::UnregisteredBlueprint(ref name) if name == "ghost"));
}

#[test]
fn create_requires_storage() {
    let mut factory: Factory<Blackhole> = Factory::new();
    factory.define("player", Options::new()).expect("define");

    let err = factory.create("player", Fields::new()).unwrap_err();
    assert!(matches!(err, Error::StorageNotConfigured));

    factory.setup(Blackhole::new());
    assert!(factory.create("player", Fields::new()).is_ok());
}

#[test]
fn has_one_by_name() {
    let mut factory = factory();
    factory
        .define("castle", Options::new().field("x", 10).field("y", 20))
        .expect("define castle");
    let castle = factory.has_one("castle", "player_id").expect("association");
    factory
        .define(
            "player",
            Options::new().field("username", "Test").association("castle", castle),
        )
        .expect("define player");

    let player = factory.create("player", Fields::new()).expect("create");

    let castle = player.record("castle").expect("castle");
    assert_eq!(castle.value("x").expect("x"), &Value::Int(10));
    assert_eq!(castle.value("y").expect("y"), &Value::Int(20));
    assert_eq!(
        castle.value("player_id").expect("player_id"),
        player.value("id").expect("id")
    );
}

#[test]
fn belongs_to_by_name() {
    let mut factory = factory();
    factory
        .define("player", Options::new().field("username", "Test"))
        .expect("define player");
    let player = factory.belongs_to("player", "player_id").expect("association");
    factory
        .define(
            "castle",
            Options::new()
                .field("x", 20)
                .field("y", 10)
                .association("player", player),
        )
        .expect("define castle");

    let castle = factory.create("castle", Fields::new()).expect("create");

    let player = castle.record("player").expect("player");
    assert_eq!(text(player, "username"), "Test");
    assert_eq!(
        castle.value("player_id").expect("player_id"),
        player.value("id").expect("id")
    );
    let storage = factory.storage().expect("storage");
    assert!(storage.position_of("players") < storage.position_of("castles"));
}

#[test]
fn has_many_by_name() {
    let mut factory = factory();
    factory
        .define("skill", Options::new().field("name", "Archery"))
        .expect("define skill");
    let skills = factory.has_many("skill", "player_id").expect("association");
    factory
        .define("player", Options::new().association("skills", skills))
        .expect("define player");

    let player = factory.create("player", Fields::new()).expect("create");

    assert_eq!(text(&player.records("skills").expect("skills")[0], "name"), "Archery");
}

#[test]
fn has_one_with_key_reads_owner_column() {
    let mut factory = factory();
    factory
        .define("castle", Options::new().field("x", 10))
        .expect("define castle");
    let castle = factory
        .has_one_with_key("castle", "owner_code", "code")
        .expect("association");
    factory
        .define(
            "player",
            Options::new().field("code", "P-7").association("castle", castle),
        )
        .expect("define player");

    let player = factory.create("player", Fields::new()).expect("create");

    let castle = player.record("castle").expect("castle");
    assert_eq!(castle.value("owner_code").expect("owner_code"), &Value::from("P-7"));
    assert!(!castle.has("player_id"));
    assert_eq!(
        factory.storage().expect("storage").statements()[1],
        "INSERT INTO castles (\"x\",\"owner_code\") VALUES ('10','P-7')"
    );
}

#[test]
fn belongs_to_with_key_copies_parent_column() {
    let mut factory = factory();
    factory
        .define("guild", Options::new().field("tag", "ALPHA"))
        .expect("define guild");
    let guild = factory
        .belongs_to_with_key("guild", "guild_tag", "tag")
        .expect("association");
    factory
        .define("player", Options::new().association("guild", guild))
        .expect("define player");

    let player = factory.create("player", Fields::new()).expect("create");

    assert_eq!(player.value("guild_tag").expect("guild_tag"), &Value::from("ALPHA"));
}

#[test]
fn has_many_with_key_reads_owner_column() {
    let mut factory = factory();
    factory
        .define("skill", Options::new().field("name", "Archery"))
        .expect("define skill");
    let skills = factory
        .has_many_with_key("skill", "player_code", "code")
        .expect("association");
    factory
        .define(
            "player",
            Options::new().field("code", "P-9").association("skills", skills),
        )
        .expect("define player");

    let player = factory.create("player", Fields::new()).expect("create");

    let skills = player.records("skills").expect("skills");
    assert_eq!(skills[0].value("player_code").expect("player_code"), &Value::from("P-9"));
}

#[test]
fn association_to_unknown_blueprint_fails() {
    let factory = factory();
    let err = factory.belongs_to("ghost", "ghost_id").unwrap_err();
    assert!(matches!(err, Error::UnregisteredBlueprint(_)));
}

#[test]
fn hooks_modify_created_records() {
    let mut factory = factory();
    factory
        .define(
            "player",
            Options::new()
                .field("username", "Test")
                .hook("before", Hook::before(|player| player.set("username", "TestModified"))),
        )
        .expect("define");

    let player = factory.create("player", Fields::new()).expect("create");

    assert_eq!(text(&player, "username"), "TestModified");
}

#[test]
fn create_allows_overriding_associations() {
    let mut factory = factory();
    factory
        .define("castle", Options::new().field("x", 20).field("y", 30))
        .expect("define castle");
    let castle = factory.has_one("castle", "player_id").expect("association");
    factory
        .define(
            "player",
            Options::new().field("username", "Test").association("castle", castle),
        )
        .expect("define player");

    let castle = factory
        .create(
            "castle",
            Fields::new().with("x", 40).with("y", 50).with("player_id", 15),
        )
        .expect("castle");
    let player = factory
        .create(
            "player",
            Fields::new()
                .with("castle", castle.clone())
                .with("username", "TestUsername")
                .with("id", 15),
        )
        .expect("player");

    let attached = player.record("castle").expect("castle");
    assert_eq!(attached.value("x").expect("x"), &Value::Int(40));
    assert_eq!(attached.value("y").expect("y"), &Value::Int(50));
    assert_eq!(
        player.value("id").expect("id"),
        castle.value("player_id").expect("player_id")
    );
}

#[test]
fn create_list_creates_ordered_records() {
    let mut factory = factory();
    factory
        .define(
            "player",
            Options::new()
                .field("username", "TestUsername")
                .sequence("email", Sequence::template("test{n}@example.com")),
        )
        .expect("define");

    let players = factory
        .create_list("player", 5, Fields::new().with("password", 123456))
        .expect("create list");

    assert_eq!(players.len(), 5);
    assert_eq!(text(&players[0], "username"), "TestUsername");
    assert_eq!(text(&players[0], "email"), "test1@example.com");
    assert_eq!(text(&players[1], "email"), "test2@example.com");
    assert_eq!(text(&players[4], "password"), "123456");
}

#[test]
fn extend_overrides_fields_and_adds_hooks() {
    let mut factory = factory();
    factory
        .define("player", Options::new().field("username", "Test"))
        .expect("define player");
    factory
        .define("castle", Options::new().field("x", 10))
        .expect("define castle");
    factory
        .extend(
            "player",
            "player_with_castles",
            Options::new()
                .field("username", "Modified")
                .hook("after", Hook::after(|player| player.set("castle_count", 2))),
        )
        .expect("extend");

    let player = factory
        .create("player_with_castles", Fields::new())
        .expect("create");
    let castles = factory
        .create_list(
            "castle",
            2,
            Fields::new().with("player_id", player.value("id").expect("id").clone()),
        )
        .expect("castles");

    assert_eq!(text(&player, "username"), "Modified");
    assert_eq!(player.value("castle_count").expect("count"), &Value::Int(2));
    assert_eq!(castles[0].value("x").expect("x"), &Value::Int(10));
    assert_eq!(
        castles[1].value("player_id").expect("player_id"),
        player.value("id").expect("id")
    );
}

#[test]
fn extend_requires_base() {
    let mut factory = factory();

    let err = factory
        .extend("player", "player_with_castles", Options::new())
        .unwrap_err();

    assert!(matches!(err, Error::MissingBaseBlueprint(ref name) if name == "player"));
}

#[test]
fn extend_rejects_taken_names() {
    let mut factory = factory();
    factory.define("player", Options::new()).expect("define");
    factory
        .extend("player", "admin", Options::new())
        .expect("first extend");

    let err = factory.extend("player", "admin", Options::new()).unwrap_err();

    assert!(matches!(err, Error::DuplicateDefinition(ref name) if name == "admin"));
}

#[test]
fn extend_retains_base_associations() {
    let mut factory = factory();
    factory
        .define("castle", Options::new().field("x", 10))
        .expect("define castle");
    factory
        .define("fortress", Options::new().field("x", 99))
        .expect("define fortress");
    let castle = factory.has_one("castle", "player_id").expect("association");
    let fortress = factory.has_one("fortress", "player_id").expect("association");
    factory
        .define(
            "player",
            Options::new().field("username", "Test").association("castle", castle),
        )
        .expect("define player");

    let extended = factory
        .extend(
            "player",
            "veteran",
            Options::new()
                .field("username", "Veteran")
                .association("castle", fortress),
        )
        .expect("extend");

    let base = factory.blueprint("player").expect("player");
    let kept = extended.association("castle").expect("castle association");
    let original = base.association("castle").expect("castle association");
    assert!(Rc::ptr_eq(kept.target(), original.target()));
    assert_eq!(extended.associations().count(), 1);

    let veteran = factory.create("veteran", Fields::new()).expect("create");
    assert_eq!(text(&veteran, "username"), "Veteran");
    let castle = veteran.record("castle").expect("castle");
    assert_eq!(castle.value("x").expect("x"), &Value::Int(10));
}

#[test]
fn extend_copies_sequences_with_independent_counters() {
    let mut factory = factory();
    factory
        .define(
            "player",
            Options::new().sequence("email", Sequence::template("p{n}@example.com")),
        )
        .expect("define");
    factory
        .extend("player", "admin", Options::new().field("role", "admin"))
        .expect("extend");

    let admin = factory.create("admin", Fields::new()).expect("admin");
    let player = factory.create("player", Fields::new()).expect("player");

    assert_eq!(text(&admin, "email"), "p1@example.com");
    assert_eq!(text(&player, "email"), "p1@example.com");
}

#[test]
fn clear_forgets_definitions_and_counters() {
    let mut factory = factory();
    factory
        .define("player", Options::new().sequence("email", Sequence::template("{n}")))
        .expect("define");
    factory.create("player", Fields::new()).expect("create");

    factory.clear();
    assert!(!factory.contains("player"));
    assert!(matches!(
        factory.create("player", Fields::new()),
        Err(Error::UnregisteredBlueprint(_))
    ));

    factory
        .define("player", Options::new().sequence("email", Sequence::template("{n}")))
        .expect("redefine");
    let player = factory.create("player", Fields::new()).expect("create");
    assert_eq!(text(&player, "email"), "1");
}

#[test]
fn reset_sequences_rewinds_counters() {
    let mut factory = factory();
    factory
        .define("player", Options::new().sequence("email", Sequence::template("{n}")))
        .expect("define");
    factory.create_list("player", 3, Fields::new()).expect("create");

    factory.reset_sequences();
    let player = factory.create("player", Fields::new()).expect("create");

    assert_eq!(text(&player, "email"), "1");
}

#[test]
fn names_follow_definition_order() {
    let mut factory = factory();
    factory.define("player", Options::new()).expect("define");
    factory.define("castle", Options::new()).expect("define");
    factory.extend("player", "admin", Options::new()).expect("extend");

    let names: Vec<&str> = factory.names().collect();
    assert_eq!(names, vec!["player", "castle", "admin"]);
}

#[test]
fn created_records_serialize_with_associations() {
    let mut factory = factory();
    factory
        .define("player", Options::new().field("username", "Test"))
        .expect("define player");
    let player = factory.belongs_to("player", "player_id").expect("association");
    factory
        .define(
            "castle",
            Options::new().field("x", 20).association("player", player),
        )
        .expect("define castle");

    let castle = factory.create("castle", Fields::new()).expect("create");

    let json = serde_json::to_value(&castle).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "x": 20,
            "player_id": 1,
            "player": {"username": "Test", "id": 1},
            "id": 2
        })
    );
}
