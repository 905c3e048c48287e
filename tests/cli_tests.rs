use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn invoicer_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("invoicer"))
}

/// Run `invoicer -C <dir> <args>` and expect success.
fn run_ok(config_path: &Path, args: &[&str]) {
    invoicer_cmd()
        .arg("-C")
        .arg(config_path)
        .args(args)
        .assert()
        .success();
}

fn init_config(temp_dir: &TempDir) -> std::path::PathBuf {
    let config_path = temp_dir.path().join("invoicer-config");
    run_ok(&config_path, &["init"]);
    config_path
}

#[test]
fn test_help() {
    invoicer_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build invoices"));
}

#[test]
fn test_version() {
    invoicer_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("invoicer"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invoicer-config");

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized invoicer config"));

    // Check files were created
    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invoicer-config");

    // First init should succeed
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    // Second init should fail
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_show_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_fresh_draft_has_one_blank_item() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:     $0.00"));

    // Nothing is written until the first edit
    assert!(!config_path.join("draft.toml").exists());
}

#[test]
fn test_items_and_adjustments_total() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Design", "--qty", "2", "--cost", "5"]);
    run_ok(&config_path, &["add-item", "--name", "Hosting", "--cost", "10"]);
    run_ok(&config_path, &["tax", "10", "--percent"]);
    run_ok(&config_path, &["discount", "3", "--fixed"]);
    run_ok(&config_path, &["shipping", "4"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Design"))
        .stdout(predicate::str::contains("Hosting"))
        .stdout(predicate::str::contains("Subtotal:  $20.00"))
        .stdout(predicate::str::contains("Tax (10%):  $2.00"))
        .stdout(predicate::str::contains("Discount (3.00 flat):  -$3.00"))
        .stdout(predicate::str::contains("Shipping:  $4.00"))
        .stdout(predicate::str::contains("Total:     $23.00"));

    assert!(config_path.join("draft.toml").exists());
}

#[test]
fn test_tax_off_remembers_value() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Work", "--cost", "100"]);
    run_ok(&config_path, &["tax", "15"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "tax", "--off"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tax: off"));

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:     $100.00"));

    // Switching back on restores 15%
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "tax"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tax: 15%"));
}

#[test]
fn test_percent_is_capped() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "discount", "250"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Discount: 100%"));
}

#[test]
fn test_edit_item_parses_leniently() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Work", "--qty", "3", "--cost", "10"]);
    run_ok(&config_path, &["edit-item", "1", "quantity", "abc"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:     $0.00"));

    run_ok(&config_path, &["edit-item", "1", "qty", "4"]);
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:     $40.00"));
}

#[test]
fn test_edit_item_out_of_range() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "edit-item", "5", "name", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No line item at position 5"));
}

#[test]
fn test_last_item_cannot_be_removed() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Only", "--cost", "7"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "remove-item", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("last item was kept"));

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Only"));
}

#[test]
fn test_remove_and_move_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Alpha", "--cost", "1"]);
    run_ok(&config_path, &["add-item", "--name", "Bravo", "--cost", "2"]);
    run_ok(&config_path, &["add-item", "--name", "Charlie", "--cost", "4"]);

    run_ok(&config_path, &["move-item", "3", "1"]);
    let draft = fs::read_to_string(config_path.join("draft.toml")).unwrap();
    let charlie = draft.find("Charlie").unwrap();
    let alpha = draft.find("Alpha").unwrap();
    assert!(charlie < alpha, "Charlie should now come first");

    run_ok(&config_path, &["remove-item", "2"]);
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha").not())
        .stdout(predicate::str::contains("Total:     $6.00"));
}

#[test]
fn test_generate_requires_parties() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Work", "--cost", "10"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fill \"From\" and \"To\" fields."));
}

#[test]
fn test_generate_requires_named_item() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["set", "--from", "Acme Ltd", "--to", "Jane Doe"]);
    run_ok(&config_path, &["add-item", "--cost", "10"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "preview"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Add at least one valid item."));

    // No file is produced on validation failure
    let output = config_path.join("output");
    assert_eq!(fs::read_dir(output).unwrap().count(), 0);
}

#[test]
fn test_set_issued_fills_due_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(
        &config_path,
        &["set", "--number", "INV-7", "--issued", "2026-01-01"],
    );

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice INV-7"))
        .stdout(predicate::str::contains("Issued:    January 01, 2026"))
        .stdout(predicate::str::contains("Due:       January 31, 2026"));
}

#[test]
fn test_set_rejects_bad_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "set", "--issued", "01/02/2026"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_currency_list_and_select() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "currency"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NGN"))
        .stdout(predicate::str::contains("Swiss Franc (CHF)"));

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "currency", "eur"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Euro (€)"));

    run_ok(&config_path, &["add-item", "--name", "Work", "--cost", "12.5"]);
    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:     €12.50"));
}

#[test]
fn test_unknown_currency() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "currency", "XYZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown currency 'XYZ'"));
}

#[test]
fn test_new_clears_draft() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["add-item", "--name", "Work", "--cost", "10"]);
    assert!(config_path.join("draft.toml").exists());

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Started a new invoice"));

    assert!(!config_path.join("draft.toml").exists());
}

#[test]
fn test_save_requires_account() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run_ok(&config_path, &["set", "--from", "Acme", "--to", "Jane"]);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in"));
}

#[test]
fn test_add_item_description_is_always_shown() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    // Flip the blank row's flag first; add-item must still show the description
    run_ok(&config_path, &["toggle-description", "1"]);
    run_ok(
        &config_path,
        &["add-item", "--name", "Audit", "--cost", "9", "--description", "Two rounds"],
    );

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Two rounds"));
}

#[test]
fn test_clients_require_account() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    invoicer_cmd()
        .args(["-C", config_path.to_str().unwrap(), "clients"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sign in"));
}
