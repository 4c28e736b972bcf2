//! End-to-end coverage of the operators, sessions, projections and
//! translating sources.

use std::sync::Mutex;

use standout_search::{
    levenshtein, search, search_all, search_translated, CaseSensitivity, CompiledPredicate,
    Criteria, Dir, EditDistance, Field, FieldKind, Filter, Literal, Matching, Number, Predicate,
    Result, SearchError, SearchOptions, Searchable, Timestamp, Translator, Value,
};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Open = 0,
    Closed = 1,
    Frozen = 2,
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    name: String,
    email: Option<String>,
    nick: Option<String>,
    city: String,
    balance: f64,
    opened: Timestamp,
    status: Status,
    active: bool,
}

const NAME: Field<Account> = Field::new("name", FieldKind::String);
const EMAIL: Field<Account> = Field::new("email", FieldKind::String);
const NICK: Field<Account> = Field::new("nick", FieldKind::String);
const CITY: Field<Account> = Field::new("city", FieldKind::String);
const BALANCE: Field<Account> = Field::new("balance", FieldKind::Number);
const OPENED: Field<Account> = Field::new("opened", FieldKind::Timestamp);
const STATUS: Field<Account> = Field::new("status", FieldKind::Enum);
const ACTIVE: Field<Account> = Field::new("active", FieldKind::Bool);

impl Searchable for Account {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "name" => Value::String(&self.name),
            "email" => Value::from(self.email.as_deref()),
            "nick" => Value::from(self.nick.as_deref()),
            "city" => Value::String(&self.city),
            "balance" => Value::Number(Number::F64(self.balance)),
            "opened" => Value::Timestamp(self.opened),
            "status" => Value::Enum(self.status as u32),
            "active" => Value::Bool(self.active),
            _ => Value::None,
        }
    }

    fn fields() -> Vec<Field<Self>> {
        vec![NAME, EMAIL, NICK, CITY, BALANCE, OPENED, STATUS, ACTIVE]
    }
}

#[allow(clippy::too_many_arguments)]
fn account(
    name: &str,
    email: Option<&str>,
    nick: Option<&str>,
    city: &str,
    balance: f64,
    opened_secs: i64,
    status: Status,
    active: bool,
) -> Account {
    Account {
        name: name.to_string(),
        email: email.map(str::to_string),
        nick: nick.map(str::to_string),
        city: city.to_string(),
        balance,
        opened: Timestamp::from_secs(opened_secs),
        status,
        active,
    }
}

fn accounts() -> Vec<Account> {
    vec![
        account(
            "Alice Smith",
            Some("alice@example.com"),
            Some("ALICE SMITH"),
            "Berlin",
            42.0,
            100,
            Status::Open,
            true,
        ),
        account(
            "Bob Stone",
            None,
            Some("bobby"),
            "Bern",
            12.5,
            200,
            Status::Closed,
            false,
        ),
        account(
            "Carol Ann",
            Some("carol@example.org"),
            None,
            "Paris",
            300.0,
            300,
            Status::Open,
            true,
        ),
        account(
            "Annabel Lee",
            Some("annabel@example.com"),
            Some("Annabel"),
            "Prague",
            -5.0,
            400,
            Status::Frozen,
            true,
        ),
    ]
}

fn first_names(found: &[&Account]) -> Vec<String> {
    found
        .iter()
        .map(|a| a.name.split(' ').next().unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// No-ops and argument validation
// ============================================================================

#[test]
fn without_fields_every_filter_is_a_noop() {
    let items = accounts();
    let session = search(&items, &[])
        .unwrap()
        .containing(["alice"])
        .greater_than(1000)
        .equal_to([true])
        .sounds_like(["Paris"]);
    assert!(session.predicate().is_true());
    assert_eq!(session.count().unwrap(), 4);
}

#[test]
fn operators_skip_fields_of_other_kinds() {
    let items = accounts();
    // text on a number field, comparison on a text field
    let text_on_numbers = search(&items, &[BALANCE]).unwrap().containing(["4"]);
    let compare_on_text = search(&items, &[NAME]).unwrap().greater_than(3);
    assert!(text_on_numbers.predicate().is_true());
    assert!(compare_on_text.predicate().is_true());
    assert_eq!(compare_on_text.count().unwrap(), 4);
}

#[test]
fn blank_terms_and_letterless_sounds_are_dropped() {
    let items = accounts();
    let session = search(&items, &[NAME, CITY])
        .unwrap()
        .containing(["", "   "])
        .starting_with(Vec::<String>::new())
        .containing_all(["\t"])
        .sounds_like(["123", "--"]);
    assert!(session.predicate().is_true());
    assert_eq!(session.count().unwrap(), 4);
}

#[test]
fn unregistered_fields_are_rejected() {
    let items = accounts();
    let unknown: Field<Account> = Field::new("phone", FieldKind::String);
    let wrong_kind: Field<Account> = Field::new("name", FieldKind::Number);

    assert!(matches!(
        search(&items, &[NAME, unknown.clone()]),
        Err(SearchError::InvalidArgument(_))
    ));
    assert!(matches!(
        search(&items, &[wrong_kind]),
        Err(SearchError::InvalidArgument(_))
    ));
    assert!(matches!(
        search(&items, &[NAME]).unwrap().containing_field(&unknown),
        Err(SearchError::InvalidArgument(_))
    ));
    assert!(matches!(
        search(&items, &[NAME]).unwrap().order_by(&unknown, Dir::Asc),
        Err(SearchError::InvalidArgument(_))
    ));
    assert!(matches!(
        Criteria::new(&[unknown]),
        Err(SearchError::InvalidArgument(_))
    ));
}

#[test]
fn incomplete_projections_fail_when_consumed() {
    let items = accounts();
    let unranked = search(&items, &[BALANCE]).unwrap().greater_than(0);
    assert!(matches!(
        unranked.to_ranked(),
        Err(SearchError::IncompleteRequest(_))
    ));

    let no_targets = search(&items, &[NAME])
        .unwrap()
        .levenshtein_distance_of(&CITY)
        .unwrap();
    assert!(matches!(
        no_targets.to_vec(),
        Err(SearchError::IncompleteRequest(_))
    ));

    assert!(matches!(
        search(&items, &[NAME]).unwrap().levenshtein_distance_of(&BALANCE),
        Err(SearchError::InvalidArgument(_))
    ));
}

// ============================================================================
// Text operators
// ============================================================================

#[test]
fn containing_ors_terms_across_fields() {
    let items = accounts();
    let found = search(&items, &[NAME, EMAIL])
        .unwrap()
        .containing(["stone", "example.org"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Bob", "Carol"]);
}

#[test]
fn containing_all_needs_every_term() {
    let items = accounts();
    let found = search(&items, &[NAME, EMAIL])
        .unwrap()
        .containing_all(["ann", "example.com"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Annabel"]);
}

#[test]
fn case_mode_applies_to_later_calls_only() {
    let items = accounts();
    let sensitive = search(&items, &[NAME])
        .unwrap()
        .set_comparison_mode(CaseSensitivity::Sensitive)
        .containing(["alice"]);
    assert_eq!(sensitive.count().unwrap(), 0);

    let earlier = search(&items, &[NAME])
        .unwrap()
        .containing(["alice"])
        .set_comparison_mode(CaseSensitivity::Sensitive);
    assert_eq!(earlier.count().unwrap(), 1);
}

#[test]
fn whole_words_requires_delimiters() {
    let items = accounts();
    let anywhere = search(&items, &[NAME]).unwrap().containing(["ann"]);
    assert_eq!(
        first_names(&anywhere.to_vec().unwrap()),
        ["Carol", "Annabel"]
    );

    let words = search(&items, &[NAME])
        .unwrap()
        .matching(Matching::WholeWords)
        .containing(["ann"]);
    assert_eq!(first_names(&words.to_vec().unwrap()), ["Carol"]);
}

#[test]
fn options_from_configuration() {
    let items = accounts();
    let options: SearchOptions =
        serde_json::from_str(r#"{"case":"sensitive","matching":"whole_words"}"#).unwrap();
    let found = search(&items, &[NAME])
        .unwrap()
        .with_options(options)
        .containing(["Lee", "smith"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Annabel"]);
}

#[test]
fn absent_text_reads_as_empty() {
    let items = accounts();
    let found = search(&items, &[EMAIL])
        .unwrap()
        .ending_with([".com"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Alice", "Annabel"]);

    let starts = search(&items, &[EMAIL])
        .unwrap()
        .starting_with(["carol"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&starts), ["Carol"]);
}

#[test]
fn field_to_field_needs_both_values() {
    let items = accounts();
    let equal = search(&items, &[NICK])
        .unwrap()
        .equal_to_field(&NAME)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&equal), ["Alice"]);

    let contained = search(&items, &[NAME])
        .unwrap()
        .containing_field(&NICK)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&contained), ["Alice", "Annabel"]);

    let prefix = search(&items, &[NAME])
        .unwrap()
        .starting_with_field(&NICK)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&prefix), ["Alice", "Annabel"]);

    let suffix = search(&items, &[NAME])
        .unwrap()
        .ending_with_field(&NICK)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&suffix), ["Alice"]);
}

#[test]
fn phonetic_matching() {
    let items = accounts();
    let forward = search(&items, &[CITY])
        .unwrap()
        .sounds_like(["Paris"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&forward), ["Carol", "Annabel"]);

    let reversed = search(&items, &[CITY])
        .unwrap()
        .reverse_sounds_like(["Bern"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&reversed), ["Bob"]);
}

// ============================================================================
// Equality and comparisons
// ============================================================================

#[test]
fn equal_to_covers_every_kind() {
    let items = accounts();
    let by_time = search(&items, &[OPENED])
        .unwrap()
        .equal_to([Timestamp::from_secs(200)]);
    assert_eq!(first_names(&by_time.to_vec().unwrap()), ["Bob"]);

    let by_status = search(&items, &[STATUS])
        .unwrap()
        .equal_to([Literal::Enum(Status::Frozen as u32)]);
    assert_eq!(first_names(&by_status.to_vec().unwrap()), ["Annabel"]);

    let by_flag = search(&items, &[ACTIVE]).unwrap().equal_to([false]);
    assert_eq!(first_names(&by_flag.to_vec().unwrap()), ["Bob"]);

    let by_text = search(&items, &[NAME]).unwrap().equal_to(["carol ann"]);
    assert_eq!(first_names(&by_text.to_vec().unwrap()), ["Carol"]);
}

#[test]
fn equal_to_kind_mismatch_never_matches() {
    let items = accounts();
    let found = search(&items, &[NAME, ACTIVE, BALANCE])
        .unwrap()
        .equal_to([false])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Bob"]);

    let open = search(&items, &[STATUS, NAME])
        .unwrap()
        .equal_to([Literal::Enum(Status::Open as u32)])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&open), ["Alice", "Carol"]);
}

#[test]
fn comparisons_over_numbers_and_timestamps() {
    let items = accounts();
    let negative = search(&items, &[BALANCE]).unwrap().less_than(0);
    assert_eq!(first_names(&negative.to_vec().unwrap()), ["Annabel"]);

    let middle = search(&items, &[BALANCE]).unwrap().between(12.5, 300);
    assert_eq!(first_names(&middle.to_vec().unwrap()), ["Alice"]);

    // a timestamp bound never compares against the number field
    let later = search(&items, &[BALANCE, OPENED])
        .unwrap()
        .greater_than(Timestamp::from_secs(250));
    assert_eq!(
        first_names(&later.to_vec().unwrap()),
        ["Carol", "Annabel"]
    );
}

#[test]
fn search_all_selects_every_field_of_a_kind() {
    let items = accounts();
    let found = search_all(&items, FieldKind::String)
        .unwrap()
        .containing(["prague", "bobby"])
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Bob", "Annabel"]);
}

// ============================================================================
// Ordering and paging
// ============================================================================

#[test]
fn order_by_with_nulls_last() {
    let items = accounts();
    let by_balance = search(&items, &[])
        .unwrap()
        .order_by(&BALANCE, Dir::Desc)
        .unwrap();
    assert_eq!(
        first_names(&by_balance.to_vec().unwrap()),
        ["Carol", "Alice", "Bob", "Annabel"]
    );

    let by_email = search(&items, &[])
        .unwrap()
        .order_by(&EMAIL, Dir::Desc)
        .unwrap();
    assert_eq!(
        first_names(&by_email.to_vec().unwrap()),
        ["Carol", "Annabel", "Alice", "Bob"]
    );
}

#[test]
fn later_keys_break_ties() {
    let items = accounts();
    let found = search(&items, &[])
        .unwrap()
        .order_by(&ACTIVE, Dir::Asc)
        .unwrap()
        .order_by(&OPENED, Dir::Desc)
        .unwrap()
        .to_vec()
        .unwrap();
    assert_eq!(first_names(&found), ["Bob", "Annabel", "Carol", "Alice"]);
}

#[test]
fn offset_and_limit_apply_after_sorting() {
    let items = accounts();
    let page = search(&items, &[])
        .unwrap()
        .order_by(&BALANCE, Dir::Asc)
        .unwrap()
        .offset(1)
        .limit(2);
    assert_eq!(first_names(&page.to_vec().unwrap()), ["Bob", "Alice"]);
    assert_eq!(page.count().unwrap(), 2);
    assert_eq!(page.first().unwrap().map(|a| a.city.as_str()), Some("Bern"));
    assert!(page.clone().offset(10).to_vec().unwrap().is_empty());
    assert!(!page.offset(10).any().unwrap());
}

// ============================================================================
// Projections
// ============================================================================

#[test]
fn distances_to_terms_and_fields() {
    let items = accounts();
    let request = search(&items, &[])
        .unwrap()
        .levenshtein_distance_of(&CITY)
        .unwrap()
        .compared_to("Bern")
        .compared_to_field(&NICK)
        .unwrap();
    let projected = request.to_vec().unwrap();
    assert_eq!(projected.len(), 4);

    let bob = &projected[1];
    assert_eq!(bob.distances[0], 0);
    assert_eq!(bob.minimum_distance(), 0);

    // absent nick reads as empty
    let carol = &projected[2];
    assert_eq!(carol.distances, vec![levenshtein("Paris", "Bern"), 5]);
    assert_eq!(carol.maximum_distance(), 5);

    let close = search(&projected, &[EditDistance::MINIMUM_DISTANCE])
        .unwrap()
        .less_than(3)
        .to_vec()
        .unwrap();
    let cities: Vec<&str> = close.iter().map(|d| d.item.city.as_str()).collect();
    assert_eq!(cities, ["Berlin", "Bern"]);
}

#[test]
fn distance_projection_exposes_item_fields() {
    let items = accounts();
    let projected = search(&items, &[])
        .unwrap()
        .levenshtein_distance_of(&NAME)
        .unwrap()
        .compared_to_all(["Bob Stone", "Bobby Stone"])
        .to_vec()
        .unwrap();
    let active_far = search(
        &projected,
        &[EditDistance::item(&ACTIVE), EditDistance::MAXIMUM_DISTANCE],
    )
    .unwrap()
    .equal_to([true])
    .order_by(&EditDistance::MAXIMUM_DISTANCE, Dir::Asc)
    .unwrap()
    .to_vec()
    .unwrap();
    assert_eq!(active_far.len(), 3);
    assert!(active_far.iter().all(|d| d.item.active));
}

// ============================================================================
// Predicate rendering and serialization
// ============================================================================

#[test]
fn predicate_display() {
    let items = accounts();
    let session = search(&items, &[NAME, BALANCE])
        .unwrap()
        .containing(["al"])
        .greater_than(3);
    assert_eq!(
        session.predicate().to_string(),
        r#"(r0.name contains~ "al" and r0.balance > 3)"#
    );
}

#[test]
fn predicate_json_shape() {
    let criteria = Criteria::new(&[NAME]).unwrap().starting_with(["Al"]);
    let json = serde_json::to_value(criteria.predicate()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "starts_with": {
                "subject": { "binding": 0, "name": "name", "kind": "string" },
                "target": { "literal": { "kind": "string", "value": "Al" } },
                "case_sensitive": false
            }
        })
    );
    let back: Predicate = serde_json::from_value(json).unwrap();
    assert_eq!(&back, criteria.predicate());
}

// ============================================================================
// Translating sources
// ============================================================================

struct Store {
    accounts: Vec<Account>,
    seen: Mutex<Vec<Predicate>>,
    offline: bool,
}

impl Store {
    fn new(offline: bool) -> Self {
        Store {
            accounts: accounts(),
            seen: Mutex::new(Vec::new()),
            offline,
        }
    }
}

impl Translator<Account> for Store {
    fn fetch(&self, predicate: &Predicate) -> Result<Vec<&Account>> {
        if self.offline {
            return Err(SearchError::translation("store offline"));
        }
        self.seen.lock().unwrap().push(predicate.clone());
        let compiled = CompiledPredicate::compile(predicate)?;
        Ok(self.accounts.iter().filter(|a| compiled.matches(*a)).collect())
    }
}

#[test]
fn translator_receives_the_finished_tree() {
    let store = Store::new(false);
    let session = search_translated(&store, &[NAME, BALANCE])
        .unwrap()
        .containing(["a"])
        .greater_than(20)
        .order_by(&BALANCE, Dir::Desc)
        .unwrap();
    let found = session.to_vec().unwrap();
    assert_eq!(first_names(&found), ["Carol", "Alice"]);

    let seen = store.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(&seen[0], session.predicate());
}

#[test]
fn translator_errors_propagate() {
    let store = Store::new(true);
    let session = search_translated(&store, &[NAME])
        .unwrap()
        .containing(["a"]);
    let err = session.to_vec().unwrap_err();
    assert!(matches!(err, SearchError::Translation(_)));
    assert_eq!(err.to_string(), "translation failed: store offline");
}
