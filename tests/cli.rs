//! E2E tests for the takehome commands

use std::process::{Command, Output};

fn takehome(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_takehome"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Post-tax pension scenario from flags
#[test]
fn calc_from_flags() {
    let output = takehome(&[
        "calc",
        "--year",
        "2021-2022",
        "--taxable",
        "24000",
        "--pension",
        "5",
        "--post-tax",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = stdout(&output);
    assert!(stdout.contains("TAKE-HOME PAY"));
    assert!(stdout.contains("£2284.20"));
    assert!(stdout.contains("£1731.84"));
    assert!(stdout.contains("£710.40"));
    assert!(stdout.contains("£19273.56"));
}

/// Same employee from a JSON file, as JSON output
#[test]
fn calc_from_input_file_json() {
    let output = takehome(&["calc", "-i", "tests/data/employee.json", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "alice");
    assert_eq!(json["fiscal_year"], "2021-2022");
    assert_eq!(json["pension_contribution"], "710.40");
    assert_eq!(json["total_deductions"], "4726.44");
    assert_eq!(json["net_income"], "19273.56");
}

/// --year overrides the year in the file for the pension band too
#[test]
fn calc_input_file_with_year_override() {
    let output = takehome(&[
        "calc",
        "-i",
        "tests/data/employee.json",
        "-y",
        "2018-2019",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["fiscal_year"], "2018-2019");
    assert_eq!(json["income_tax"], "2430.00");
    assert_eq!(json["pension_contribution"], "718.72");
}

#[test]
fn calc_with_band_breakdown() {
    let output = takehome(&[
        "calc",
        "-y",
        "2021-2022",
        "-t",
        "57012.28",
        "--bands",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = stdout(&output);
    assert!(stdout.contains("BANDS"));
    assert!(stdout.contains("£10233.31"));
    assert!(stdout.contains("£6733.28"));
}

#[test]
fn calc_rejects_both_pension_modes() {
    let output = takehome(&[
        "calc",
        "-y",
        "2021-2022",
        "-t",
        "24000",
        "-p",
        "5",
        "--pre-tax",
        "--post-tax",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Pension must be either pre OR post tax"));
}

#[test]
fn calc_pension_mode_requires_pension() {
    let output = takehome(&["calc", "-y", "2021-2022", "-t", "24000", "--post-tax"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--pension"));
}

#[test]
fn calc_rejects_out_of_range_year() {
    let output = takehome(&["calc", "-y", "2147483647/00", "-t", "24000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid fiscal year"));
}

#[test]
fn calc_rejects_non_numeric_income() {
    let output = takehome(&["calc", "-y", "2021-2022", "-t", "lots"]);
    assert!(!output.status.success());
}

#[test]
fn calc_unknown_year_fails() {
    let output = takehome(&["calc", "-y", "2030-2031", "-t", "24000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Year not valid: 2030-2031"));
}

#[test]
fn calc_with_custom_rate_file() {
    let output = takehome(&[
        "--rates",
        "tests/data/rates_2023.json",
        "calc",
        "-y",
        "2022-2023",
        "-t",
        "30000",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["income_tax"], "3486.00");
    assert_eq!(json["national_insurance"], "2091.60");
    assert_eq!(json["net_income"], "24422.40");
}

/// Each row is calculated independently; failures don't stop the batch
#[test]
fn batch_csv_output() {
    let output = takehome(&["batch", "-f", "tests/data/employees.csv", "--csv"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = stdout(&output);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("name,year,gross_income"));
    assert!(lines[1].contains("£19273.56"));
    assert!(lines[2].contains("£10233.31"));
    assert!(lines[3].contains("Year not valid: 2030-2031"));
}

#[test]
fn rates_for_one_year() {
    let output = takehome(&["rates", "-y", "2018-2019"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let stdout = stdout(&output);
    assert!(stdout.contains("£11850.00"));
    assert!(stdout.contains("£46356.00"));
    assert!(!stdout.contains("2021-2022"));
}

#[test]
fn rates_json_includes_custom_year() {
    let output = takehome(&["--rates", "tests/data/rates_2023.json", "rates", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let years = json["years"].as_object().unwrap();
    assert_eq!(years.len(), 5);
    assert!(years.contains_key("2022-2023"));
}

#[test]
fn schema_csv_header_matches_batch_format() {
    let output = takehome(&["schema", "csv-header"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout(&output).trim(),
        "name,year,taxable_income,non_taxable_income,pre_tax_expense,post_tax_expense,pension_pct,pension_mode"
    );
}

#[test]
fn schema_employee_is_json_schema() {
    let output = takehome(&["schema"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["title"], "EmployeeInput");
    assert!(json["properties"]["taxable_income"].is_object());
}
