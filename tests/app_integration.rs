use ledgerfolio::cli::OutputFormat;
use ledgerfolio::core::{Analytics, BalanceSnapshots, CachedAnalytics, Computed};
use ledgerfolio::store::CsvStore;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tempfile::TempDir;
use tracing::info;

mod test_utils {
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const TRANSACTIONS: &str = "\
nome,tipo_transacao,valor,data
PETR4,Aporte,1000.00,2022-01-03
PETR4,Saldo,1150.00,2023-01-03
PETR4,Saldo,1210.00,2024-01-03
VALE3,Aporte,2000.00,2023-01-03
VALE3,Resgate,300.00,2023-06-01
VALE3,Saldo,1800.00,2024-01-03
Tesouro Selic,Aporte,500.00,2024-01-03
Tesouro Selic,Saldo,500.00,2024-01-03
Bitcoin,Saldo,100.00,2024-01-03
";

    pub const TYPES: &str = "\
nome,tipo_de_investimento
PETR4,Stocks
VALE3,Stocks
Tesouro Selic,Bonds
";

    pub const RISKS: &str = "\
tipo_de_investimento,risco
Stocks,high
Bonds,low
";

    /// Writes the ledger CSVs and a config file pointing at them.
    pub fn write_ledger(dir: &Path, snapshots: &str) -> PathBuf {
        fs::write(dir.join("lancamentos.csv"), TRANSACTIONS).unwrap();
        fs::write(dir.join("categoria_tipo.csv"), TYPES).unwrap();
        fs::write(dir.join("categoria_risco.csv"), RISKS).unwrap();

        let config_path = dir.join("config.yaml");
        let config = format!(
            r#"
ledger:
  transactions: lancamentos.csv
  investment_types: categoria_tipo.csv
  risk_tiers: categoria_risco.csv
balance_snapshots: {snapshots}
display:
  currency_symbol: "R$"
  decimal_separator: ","
  thousands_separator: "."
"#
        );
        fs::write(&config_path, config).unwrap();
        config_path
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn csv_store(dir: &Path) -> CsvStore {
    CsvStore::new(
        dir.join("lancamentos.csv"),
        dir.join("categoria_tipo.csv"),
        dir.join("categoria_risco.csv"),
    )
}

#[test_log::test]
fn test_full_app_flow_summary_and_returns() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_ledger(dir.path(), "latest");
    let config_path = config_path.to_str().unwrap();

    for (command, format) in [
        (ledgerfolio::AppCommand::Summary, OutputFormat::Table),
        (ledgerfolio::AppCommand::Summary, OutputFormat::Json),
        (ledgerfolio::AppCommand::Returns, OutputFormat::Table),
        (ledgerfolio::AppCommand::Returns, OutputFormat::Json),
    ] {
        let result = ledgerfolio::run_command(command, Some(config_path), format);
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test]
fn test_missing_ledger_file_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_ledger(dir.path(), "all");
    fs::remove_file(dir.path().join("lancamentos.csv")).unwrap();

    let err = ledgerfolio::run_command(
        ledgerfolio::AppCommand::Summary,
        Some(config_path.to_str().unwrap()),
        OutputFormat::Table,
    )
    .unwrap_err();

    info!("Received expected error: {err:#}");
    assert!(err.to_string().contains("ledger store unavailable"));
}

#[test_log::test]
fn test_csv_ledger_aggregations() {
    let dir = TempDir::new().unwrap();
    test_utils::write_ledger(dir.path(), "all");
    let store = csv_store(dir.path());

    let all = Analytics::new(&store, &store, BalanceSnapshots::All);
    // Both PETR4 snapshots count when summing every snapshot
    assert_eq!(all.compute_total_balance().unwrap(), Some(dec("4760")));

    let latest = Analytics::new(&store, &store, BalanceSnapshots::Latest);
    assert_eq!(latest.compute_total_balance().unwrap(), Some(dec("3610")));

    let by_type = latest.compute_balance_by_type().unwrap();
    let rows: Vec<_> = by_type
        .iter()
        .map(|g| (g.label.as_deref(), g.total, g.count))
        .collect();
    assert_eq!(
        rows,
        vec![
            (Some("Stocks"), dec("3010"), 2),
            (Some("Bonds"), dec("500"), 1),
            (None, dec("100"), 1),
        ]
    );
    let by_type_total: Decimal = by_type.iter().map(|g| g.total).sum();
    assert_eq!(Some(by_type_total), latest.compute_total_balance().unwrap());

    let by_risk = latest.compute_balance_by_risk().unwrap();
    let labels: Vec<_> = by_risk.iter().map(|g| g.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("high"), Some("low"), None]);
}

#[test_log::test]
fn test_csv_ledger_returns() {
    let dir = TempDir::new().unwrap();
    test_utils::write_ledger(dir.path(), "all");
    let store = csv_store(dir.path());
    let analytics = CachedAnalytics::new(Analytics::new(&store, &store, BalanceSnapshots::All));

    let returns = analytics.compute_returns().unwrap();
    let names: Vec<_> = returns.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["PETR4", "VALE3", "Tesouro Selic"]);

    let petr4 = &returns[0];
    assert_eq!(petr4.current_balance, dec("1210"));
    assert_eq!(petr4.holding_years, dec("2.00"));
    assert_eq!(petr4.net_return, dec("210"));
    assert_eq!(petr4.return_percent, Computed::Value(dec("21")));
    let annualized = petr4.annualized_return_percent.value().unwrap();
    assert!((annualized - dec("10")).abs() < dec("0.05"), "got {annualized}");

    let vale3 = &returns[1];
    assert_eq!(vale3.total_withdrawals, dec("300"));
    // 1800 - 2000 + 300
    assert_eq!(vale3.net_return, dec("100"));
    assert_eq!(vale3.return_percent, Computed::Value(dec("5")));
    // Balance fell below contributions, so growth is negative despite the profit
    assert!(vale3.annualized_return_percent.value().unwrap() < Decimal::ZERO);

    let selic = &returns[2];
    assert!(!selic.annualized_return_percent.is_computable());
    assert_eq!(selic.return_percent, Computed::Value(Decimal::ZERO));

    let overview = analytics.compute_overview().unwrap();
    assert_eq!(overview.investment_count, 3);
    assert_eq!(overview.total_net_return, dec("310"));
}
