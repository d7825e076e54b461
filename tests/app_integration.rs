use chrono::{TimeZone, Utc};
use tracing::info;
use tripwise::core::analysis::BudgetStatus;
use tripwise::core::config::AppConfig;
use tripwise::core::currency::CurrencyRateProvider;
use tripwise::core::error::TripError;
use tripwise::core::model::{ExpenseCategory, NewExpense, VacationInput};

mod test_utils {
    use std::fs;
    use tempfile::{NamedTempFile, TempDir};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, rate: f64) -> MockServer {
        let mock_server = MockServer::start().await;
        let mock_response = format!(
            r#"{{ "chart": {{ "result": [ {{ "meta": {{ "regularMarketPrice": {rate} }} }} ] }} }}"#
        );

        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Writes a config whose data lives under `data_dir`. `extra` is appended verbatim.
    pub fn write_config(data_dir: &TempDir, store: &str, extra: &str) -> NamedTempFile {
        let config_file = NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
currency: "USD"
base_currency: "USD"
store: {store}
data_path: "{}"
rates:
  - from: EUR
    to: USD
    rate: 1.1
  - from: USD
    to: JPY
    rate: 150.0
{extra}
"#,
            data_dir.path().display()
        );
        fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

fn lisbon() -> VacationInput {
    VacationInput {
        destination: "Lisbon".to_string(),
        country: "Portugal".to_string(),
        hotel_name: "Bairro Alto".to_string(),
        start_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap(),
        budget: Some(1000.0),
        budget_currency: "EUR".to_string(),
        currency: None,
        image: None,
    }
}

fn dinner(vacation_id: &str, amount: f64, currency: &str) -> NewExpense {
    NewExpense {
        vacation_id: vacation_id.to_string(),
        amount,
        currency: currency.to_string(),
        category: ExpenseCategory::Food,
        description: "Dinner".to_string(),
        date: Utc.with_ymd_and_hms(2025, 6, 2, 20, 0, 0).unwrap(),
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_memory_store() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "memory", "");
    let config_path = config_file.path().to_str().unwrap();

    let commands = vec![
        tripwise::AppCommand::AddTrip(lisbon()),
        tripwise::AppCommand::Trips,
        tripwise::AppCommand::Currencies(Some("yen".to_string())),
        tripwise::AppCommand::Convert {
            amount: 100.0,
            from: "EUR".to_string(),
            to: "JPY".to_string(),
        },
    ];
    for command in commands {
        info!(?command, "Running command");
        let result = tripwise::run_command(command, Some(config_path)).await;
        assert!(
            result.is_ok(),
            "Command failed with: {:?}",
            result.err()
        );
    }
}

#[test_log::test(tokio::test)]
async fn test_invalid_trip_is_reported() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "memory", "");

    let mut input = lisbon();
    input.end_date = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
    let err = tripwise::run_command(
        tripwise::AppCommand::AddTrip(input),
        Some(config_file.path().to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert!(matches!(TripError::find(&err), Some(TripError::InvalidInput(_))));
}

#[test_log::test(tokio::test)]
async fn test_disk_store_survives_restart_and_cascades() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "disk", "");
    let config = AppConfig::load_from_path(config_file.path()).unwrap();

    let vacation_id = {
        let planner = tripwise::build_planner(&config).unwrap();
        let vacation = planner.create_vacation(lisbon()).await.unwrap();
        let stored = planner
            .add_expense(dinner(&vacation.id, 100.0, "EUR"))
            .await
            .unwrap();
        assert!((stored.base_currency_amount - 110.0).abs() < 1e-9);
        vacation.id
    };

    let planner = tripwise::build_planner(&config).unwrap();
    let vacations = planner.vacations().await.unwrap();
    assert_eq!(vacations.len(), 1);
    assert_eq!(vacations[0].id, vacation_id);

    let now = Utc.with_ymd_and_hms(2025, 6, 5, 0, 0, 0).unwrap();
    let analysis = planner
        .analyze_vacation_at(&vacation_id, Some("EUR"), now)
        .await
        .unwrap();
    assert_eq!(analysis.total_budget, 1000.0);
    assert!((analysis.total_expenses - 100.0).abs() < 1e-9);
    assert_eq!(analysis.status, BudgetStatus::UnderBudget);

    assert!(planner.delete_vacation(&vacation_id).await.unwrap());
    assert!(planner.vacations().await.unwrap().is_empty());
    assert!(planner.expenses(&vacation_id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_live_rates_fill_gaps_in_rate_table() {
    let mock_server = test_utils::create_mock_server("GBPUSD=X", 1.25).await;
    let data_dir = tempfile::TempDir::new().unwrap();
    let extra = format!(
        r#"providers:
  yahoo:
    base_url: "{}"
"#,
        mock_server.uri()
    );
    let config_file = test_utils::write_config(&data_dir, "memory", &extra);
    let config = AppConfig::load_from_path(config_file.path()).unwrap();

    let rates = tripwise::build_rate_provider(&config).unwrap();
    assert!((rates.get_rate("EUR", "USD").await.unwrap() - 1.1).abs() < 1e-9);
    assert!((rates.get_rate("GBP", "USD").await.unwrap() - 1.25).abs() < 1e-9);
}

#[test_log::test(tokio::test)]
async fn test_unknown_currency_converts_at_identity() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "memory", "");
    let config = AppConfig::load_from_path(config_file.path()).unwrap();

    let planner = tripwise::build_planner(&config).unwrap();
    let converter = planner.converter();
    assert_eq!(converter.convert(100.0, "ZZZ", "USD").await, 100.0);
    assert_eq!(converter.convert(0.0, "EUR", "JPY").await, 0.0);
    assert!(converter.get_currency_info("ZZZ").is_none());
    assert_eq!(converter.get_currency_sections().popular[0].code, "USD");
}

#[test_log::test(tokio::test)]
async fn test_expense_for_removed_trip_is_rejected() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "memory", "");
    let config = AppConfig::load_from_path(config_file.path()).unwrap();
    let planner = tripwise::build_planner(&config).unwrap();

    let vacation = planner.create_vacation(lisbon()).await.unwrap();
    assert!(planner.delete_vacation(&vacation.id).await.unwrap());

    let err = planner
        .add_expense(dinner(&vacation.id, 10.0, "EUR"))
        .await
        .unwrap_err();
    assert_eq!(
        TripError::find(&err),
        Some(&TripError::VacationNotFound(vacation.id.clone()))
    );
}

#[test_log::test(tokio::test)]
async fn test_remove_expense_command_on_disk_store() {
    let data_dir = tempfile::TempDir::new().unwrap();
    let config_file = test_utils::write_config(&data_dir, "disk", "");
    let config_path = config_file.path().to_str().unwrap();
    let config = AppConfig::load_from_path(config_file.path()).unwrap();

    let (vacation_id, expense_id) = {
        let planner = tripwise::build_planner(&config).unwrap();
        let vacation = planner.create_vacation(lisbon()).await.unwrap();
        let expense = planner
            .add_expense(dinner(&vacation.id, 25.0, "EUR"))
            .await
            .unwrap();
        (vacation.id, expense.id)
    };

    tripwise::run_command(
        tripwise::AppCommand::RemoveExpense(expense_id.clone()),
        Some(config_path),
    )
    .await
    .unwrap();

    let planner = tripwise::build_planner(&config).unwrap();
    assert!(planner.expenses(&vacation_id).await.unwrap().is_empty());
    assert!(!planner.delete_expense(&expense_id).await.unwrap());
}
