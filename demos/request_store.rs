//! Walks one request through review and submission against a throwaway sled store.
//!
//! Run with `cargo run --example request_store`; set `RUST_LOG=debug` to see commits.

use anyhow::Context;
use sgpm_workflow::{
    config::Config,
    dates::AssignableDateField,
    logger::init_logger,
    request::{MigratoryRequest, ServiceType, TimeStamp},
    service::RequestService,
    status::RequestStatus,
};

fn main() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config {
        db_path: dir.path().join("demo.db"),
        ..Config::default()
    };
    init_logger(&config.log_filter);

    let service = RequestService::open(&config)?;
    let advisor = "alice@sgpm.test";

    let request = MigratoryRequest::new(service.new_request_code()?, TimeStamp::new())
        .set_service_type(ServiceType::WorkVisa)
        .set_applicant("0102030405")
        .set_advisor(advisor);
    let code = service.create_request(request)?.code().to_string();

    let today = TimeStamp::new().date().to_iso();
    service.change_status(&code, RequestStatus::InReview, advisor, "", None)?;
    service.assign_process_date(&code, AssignableDateField::Reception, &today, advisor, None)?;
    service.assign_process_date(&code, AssignableDateField::Submission, &today, advisor, None)?;
    service.change_status(&code, RequestStatus::Submitted, advisor, "", None)?;

    if let Err(e) = service.change_status(&code, RequestStatus::Rejected, advisor, "", None) {
        println!("refused as expected: {e}");
    }

    let stored = service.get_request(&code)?.context("request vanished")?;
    println!("{} is {}", stored.code(), stored.status());
    for record in stored.state_history() {
        println!(
            "  {} {} -> {} by {} ({})",
            record.date, record.previous, record.new, record.actor, record.reason
        );
    }
    for (field, value) in stored.key_dates() {
        println!("  {field}: {}", value.as_deref().unwrap_or("-"));
    }

    Ok(())
}
