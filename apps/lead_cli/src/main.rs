use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use shared::domain::{FormField, FormKind, SectionId};
use site_core::{
    config::validate_backend_url, events::event_channel, load_settings, HttpLeadApi,
    NavigationController, ScrollObserver, Settings, SiteEvent, StackedLayout, StatusKind,
    SubmissionController, SubmissionStatus, SubmitOutcome,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Submit lead-capture forms and probe the site API")]
struct Cli {
    /// Overrides the configured backend base URL.
    #[arg(long)]
    backend_url: Option<String>,
    /// Print status transitions as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit the general contact form.
    Contact(FormArgs),
    /// Submit an institution collaboration request.
    Collaborate(FormArgs),
    /// Check that the backend is up.
    Health,
    /// Print submission counts from the backend.
    Stats,
    /// Show which nav link the scroll spy highlights at a scroll offset.
    Spy {
        #[arg(long)]
        scroll_y: f64,
        /// Section heights in page order.
        #[arg(long, value_delimiter = ',', default_values_t = [800.0, 600.0, 700.0, 500.0, 900.0])]
        heights: Vec<f64>,
    },
}

#[derive(Args, Debug)]
struct FormArgs {
    #[arg(long, default_value = "")]
    institution_name: String,
    #[arg(long, default_value = "")]
    contact_person: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    message: String,
}

impl FormArgs {
    fn fields(&self) -> [(FormField, &str); 5] {
        [
            (FormField::InstitutionName, &self.institution_name),
            (FormField::ContactPerson, &self.contact_person),
            (FormField::Email, &self.email),
            (FormField::Phone, &self.phone),
            (FormField::Message, &self.message),
        ]
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load site settings")?;
    if let Some(url) = &cli.backend_url {
        settings.backend_url = validate_backend_url(url)?;
    }

    match cli.command {
        Command::Contact(form) => submit(&settings, FormKind::Contact, &form, cli.json).await,
        Command::Collaborate(form) => {
            submit(&settings, FormKind::Collaboration, &form, cli.json).await
        }
        Command::Health => {
            let api = HttpLeadApi::from_settings(&settings)?;
            let health = api
                .health()
                .await
                .with_context(|| format!("health check against {} failed", api.base_url()))?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            Ok(())
        }
        Command::Stats => {
            let api = HttpLeadApi::from_settings(&settings)?;
            let stats = api.submission_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Spy { scroll_y, heights } => spy(&settings, scroll_y, &heights),
    }
}

async fn submit(settings: &Settings, kind: FormKind, form: &FormArgs, json: bool) -> Result<()> {
    let api = HttpLeadApi::from_settings(settings)?;
    info!(form = %kind, backend_url = %api.base_url(), "cli: submitting");
    let (events, mut rx) = event_channel();
    let controller =
        SubmissionController::new(kind, Arc::new(api), settings.status_clear_delay, events);
    for (field, value) in form.fields() {
        controller.form().set_field(field, value);
    }

    let result = controller.submit().await;
    while let Ok(SiteEvent::SubmissionStatusChanged { status, .. }) = rx.try_recv() {
        print_status(kind, &status, json)?;
    }

    match result? {
        SubmitOutcome::Succeeded { submission_id, .. } => {
            if let Some(id) = submission_id {
                println!("submission_id={id}");
            }
            Ok(())
        }
        SubmitOutcome::Failed { message } => bail!("{kind} submission failed: {message}"),
        SubmitOutcome::Superseded => bail!("{kind} submission was superseded"),
    }
}

fn print_status(kind: FormKind, status: &SubmissionStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(status)?);
        return Ok(());
    }
    let label = match status.kind {
        StatusKind::Idle => "idle",
        StatusKind::Loading => "loading",
        StatusKind::Success => "success",
        StatusKind::Error => "error",
    };
    println!("[{kind}] {label}: {}", status.message().unwrap_or_default());
    Ok(())
}

fn spy(settings: &Settings, scroll_y: f64, heights: &[f64]) -> Result<()> {
    if heights.len() != SectionId::ALL.len() {
        bail!(
            "expected {} section heights, got {}",
            SectionId::ALL.len(),
            heights.len()
        );
    }

    let layout = Arc::new(StackedLayout::new(
        SectionId::ALL.iter().copied().zip(heights.iter().copied()),
    ));
    layout.scroll_to(scroll_y);

    let (events, _rx) = event_channel();
    let observer = ScrollObserver::new(
        layout.clone(),
        settings.scroll_reference_offset,
        events.clone(),
    );
    let nav = NavigationController::new(layout, observer.subscribe(), events);
    observer.on_scroll();

    for link in nav.links() {
        let marker = if link.active { "*" } else { " " };
        println!("{marker} {:<18} #{}", link.label, link.section);
    }
    Ok(())
}
