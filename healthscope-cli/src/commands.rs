//! Subcommand implementations

use crate::cli::{AssessArgs, KeyAction, PlanArgs};
use anyhow::{bail, Context as _, Result};
use healthscope_core::assessment::{self, HealthProfile};
use healthscope_core::config::{
    self, Credential, CredentialStore, FileCredentialStore, HealthscopeConfig,
};
use healthscope_core::pipeline::CompletionPipeline;
use healthscope_core::prompt::{Domain, GenerationSettings, InputRecord, RequestBuilder};
use healthscope_core::protocol::CompletionRequest;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const APP_DIR: &str = "healthscope";
const CONFIG_FILE: &str = "config.yaml";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Everything a subcommand needs, resolved once at startup
pub struct Context {
    config: HealthscopeConfig,
    store: FileCredentialStore,
    streaming: bool,
}

impl Context {
    pub fn load(explicit: Option<&Path>, no_stream: bool) -> Result<Self> {
        let app_dir = dirs::config_dir().map(|dir| dir.join(APP_DIR));

        let config = match explicit {
            Some(path) => config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => match app_dir.as_ref().map(|dir| dir.join(CONFIG_FILE)) {
                Some(path) if path.exists() => config::load(&path)
                    .with_context(|| format!("Failed to load config from {}", path.display()))?,
                _ => {
                    debug!("No config file found, using defaults");
                    HealthscopeConfig::default()
                }
            },
        };

        let store_path = app_dir
            .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
            .join(CREDENTIALS_FILE);

        Ok(Self {
            streaming: config.model.streaming && !no_stream,
            config,
            store: FileCredentialStore::new(store_path),
        })
    }

    /// Config `api_key` first, then the key store
    fn credential(&self) -> Result<Credential> {
        if let Some(key) = self.config.api_key.as_ref().filter(|key| !key.is_missing()) {
            return Ok(key.clone());
        }
        Ok(self.store.load()?.unwrap_or_default())
    }

    fn builder(&self) -> RequestBuilder {
        RequestBuilder::new(GenerationSettings::from_config(&self.config).with_streaming(self.streaming))
    }
}

pub fn key(context: &Context, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Set { key } => {
            let credential = Credential::new(key.trim());
            context.store.save(&credential)?;
            if credential.is_missing() {
                println!("API key removed from {}", context.store.path().display());
            } else {
                println!(
                    "API key {} saved to {}",
                    credential.partial_redact(),
                    context.store.path().display()
                );
            }
        }
        KeyAction::Clear => {
            context.store.clear()?;
            println!("API key removed from {}", context.store.path().display());
        }
        KeyAction::Status => {
            if context.config.api_key.as_ref().is_some_and(|key| !key.is_missing()) {
                println!("Using API key from config file");
            }
            match context.store.load()? {
                Some(key) => println!("Stored API key: {}", key.partial_redact()),
                None => println!("No stored API key. Set one with `healthscope key set <KEY>`."),
            }
        }
    }
    Ok(())
}

pub async fn assess(context: &Context, args: AssessArgs) -> Result<()> {
    let record: InputRecord = args.fields.into_iter().collect();
    let result = assessment::assess(args.condition, &record)?;

    println!("{} assessment", result.condition.display_name());
    for (field, points) in &result.contributions {
        println!("  {:<14} +{}", field, points);
    }
    println!(
        "Score {} (high risk at {}): {}",
        result.score,
        result.threshold,
        result.label()
    );

    if !args.explain {
        return Ok(());
    }

    println!();
    let request = context.builder().build(
        &Domain::RiskExplanation {
            condition: result.condition,
            high_risk: result.high_risk,
        },
        &record,
    );
    run_exchange(context, request).await
}

pub async fn plan(context: &Context, args: PlanArgs) -> Result<()> {
    let profile = HealthProfile {
        age: args.age,
        weight_kg: args.weight,
        height_cm: args.height,
        sex: args.sex,
        activity_level: args.activity,
        dietary_preference: args.diet,
        fitness_goal: args.goal,
    };

    match (profile.bmi(), profile.bmi_category()) {
        (Some(bmi), Some(category)) => println!("BMI {:.1} ({})\n", bmi, category),
        _ => bail!("Height must be greater than zero"),
    }

    let request = context.builder().build(&Domain::HealthPlan, &profile.to_record());
    run_exchange(context, request).await
}

/// Stream one exchange to stdout. Ctrl-C cancels it.
async fn run_exchange(context: &Context, request: CompletionRequest) -> Result<()> {
    let pipeline = CompletionPipeline::from_config(&context.config)?;
    let credential = context.credential()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let outcome = pipeline
        .execute(request, credential, cancel, |text| {
            if let Err(e) = write!(stdout, "{}", text).and_then(|_| stdout.flush()) {
                warn!("Failed to write to stdout: {}", e);
            }
        })
        .await;
    interrupt.abort();

    match outcome {
        Ok(result) => {
            println!("\n\n[completed in {:.0} ms]", result.elapsed_ms());
            Ok(())
        }
        Err(failure) => {
            if !failure.partial.full_text().is_empty() {
                println!("\n\n[stopped after {:.0} ms]", failure.partial.elapsed_ms());
            }
            if let Some(hint) = failure.error.hint() {
                eprintln!("{}", hint);
            }
            Err(failure.into())
        }
    }
}
