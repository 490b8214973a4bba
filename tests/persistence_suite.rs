mod common;

use std::fs;

use common::{date, expense_rule, setup_test_env};
use keena_core::{
    core::{run_catch_up, utils::tmp_path},
    ledger::{Frequency, RecordId},
    storage::{FileKv, JsonStorage, StorageBackend, TRANSACTIONS_KEY},
};

#[test]
fn atomic_write_failure_preserves_stored_transactions() {
    let (base, _config) = setup_test_env();
    let storage = JsonStorage::new(FileKv::new(base.join("data")).unwrap());
    storage
        .insert_recurring_rule(expense_rule("Water", Frequency::Monthly, date(2024, 1, 5)))
        .unwrap();
    run_catch_up(&storage, date(2024, 1, 5));

    let path = storage.kv().path_for(TRANSACTIONS_KEY);
    let original = fs::read_to_string(&path).expect("read original file");

    // A directory squatting on the temp file name makes the next write fail.
    let tmp = tmp_path(&path);
    fs::create_dir_all(&tmp).unwrap();

    let report = run_catch_up(&storage, date(2024, 3, 5));
    assert!(report.generated.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        fs::read_to_string(&path).expect("read after failure"),
        original,
        "stored transactions must be untouched"
    );
    let rules = storage.load_recurring_rules().unwrap().rules;
    assert_eq!(rules[0].next_due_date, date(2024, 2, 5));

    fs::remove_dir_all(&tmp).unwrap();
    let recovered = run_catch_up(&storage, date(2024, 3, 5));
    assert_eq!(recovered.generated.len(), 2);
    assert_eq!(storage.load_transactions().unwrap().len(), 3);
}

#[test]
fn records_written_by_the_browser_app_load_unchanged() {
    let (base, _config) = setup_test_env();
    let data = base.join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("keena_recurring_transactions.json"),
        r#"[{"id":"rectxn_1700000000000_abc123xyz","title":"Netflix","amount":54000,
            "type":"expense","category":"Langganan","frequency":"monthly",
            "startDate":"2024-01-15T00:00:00.000Z","nextDueDate":"2024-02-15T00:00:00.000Z"}]"#,
    )
    .unwrap();
    fs::write(
        data.join("keena_transactions.json"),
        r#"[{"id":"txn_1705276800000_q8w7e6r5t","title":"Netflix","amount":54000,
            "type":"expense","category":"Langganan","date":"2024-01-15T00:00:00.000Z",
            "recurringTransactionId":"rectxn_1700000000000_abc123xyz"}]"#,
    )
    .unwrap();
    fs::write(
        data.join("keena_categories.json"),
        r##"[{"id":"cat-exp-5","name":"Langganan","type":"expense","icon":"🔁",
            "color":"#93E9BE"}]"##,
    )
    .unwrap();

    let storage = JsonStorage::open_dir(&data).unwrap();
    let categories = storage.load_categories().unwrap();
    assert_eq!(categories.len(), 1, "stored categories are not reseeded");
    assert_eq!(categories[0].id.as_str(), "cat-exp-5");

    let report = run_catch_up(&storage, date(2024, 3, 20));

    assert!(report.warnings.is_empty());
    let dates: Vec<_> = report.transactions.iter().map(|txn| txn.date).collect();
    assert_eq!(dates, vec![date(2024, 3, 15), date(2024, 2, 15), date(2024, 1, 15)]);
    assert_eq!(report.transactions[2].id.as_str(), "txn_1705276800000_q8w7e6r5t");
    let rule_id = RecordId::from("rectxn_1700000000000_abc123xyz");
    assert!(report.transactions.iter().all(|txn| txn.generated_by(&rule_id)));
    assert_eq!(
        storage.load_recurring_rules().unwrap().rules[0].next_due_date,
        date(2024, 4, 15)
    );
}
