//! Sign-up Form
//!
//! A scripted form session showing formstate end to end:
//! - Fields and rules loaded from a RON file
//! - Rule enforcement through `RuleValidator`
//! - Subscribers reacting to value, visibility and report changes
//! - Every notification recorded in a journal and audited at the end
//!
//! Set `RUST_LOG=debug` to see ignored operations and dispatch traces.

use formstate_core::{FormStateReport, StateContainer, Value};
use formstate_journal::{Auditor, Journal};
use formstate_script::Loader;
use formstate_validate::RuleValidator;
use tracing_subscriber::EnvFilter;

const SIGNUP_FORM: &str = include_str!("../data/signup.ron");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut loader = Loader::new();
    loader.load_str(SIGNUP_FORM)?;
    let form_def = loader.finish();

    let journal = Journal::new();
    journal.start_recording();

    let form = form_def
        .builder()
        .validator(RuleValidator::new())
        .logger_rc(journal.logger())
        .build()?;

    wire_subscribers(&form);

    println!("--- filling in the form ---");
    form.set_value("email", "ada@")?;
    form.set_value("email", "ada@example.com")?;
    form.set_value("password", "short")?;
    form.set_value("password", "analytical1843")?;
    form.set_value("age", 36)?;
    form.set_value("country", "pt")?;

    println!("\n--- submitting ---");
    form.validate_all()?;
    print_report(&form.state_report());

    println!("\n--- discarding changes ---");
    form.hard_reset_state();
    print_report(&form.state_report());

    println!();
    print!("{}", Auditor::new(&journal).generate_report());
    Ok(())
}

fn init_logging() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("info")
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn wire_subscribers(form: &StateContainer) {
    // Subscriptions live as long as the form; the handles are not needed
    for field in ["email", "password", "age"] {
        let _ = form.on_validation_change(field, move |state| {
            if state.error {
                println!("  {} -> {}", field, state.message);
            }
        });
    }

    let _ = form.on_visibility_change("vat_number", |hidden| {
        println!("  vat_number is {}", if hidden { "hidden" } else { "shown" });
    });

    // Non-Spanish residents must also give a VAT number
    let handle = form.clone();
    let _ = form.on_value_change("country", move |country| {
        if country == &Value::from("es") {
            handle.hide("vat_number");
        } else {
            handle.show("vat_number");
        }
    });

    let _ = form.on_report_change(|report| {
        tracing::info!(valid = report.is_valid, changed = report.has_changed, "{}", report.debug);
    });
}

fn print_report(report: &FormStateReport) {
    println!("valid:   {}", report.is_valid);
    println!("changed: {}", report.has_changed);
    println!("debug:   {}", report.debug);
    for (field, value) in &report.changes {
        println!("  {} = {}", field, value);
    }
}
