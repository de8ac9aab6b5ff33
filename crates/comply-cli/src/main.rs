// crates/comply-cli/src/main.rs
// ============================================================================
// Module: Comply CLI Entry Point
// Description: Command dispatcher for rule administration and assessments.
// Purpose: Provide a safe operator CLI over the store and the engine.
// Dependencies: clap, comply-config, comply-core, comply-providers,
// comply-store-sqlite, serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! The Comply CLI wires the configured `SQLite` store, the JSON asset
//! document, and the system clock into the assessment engine. Results are
//! emitted as pretty-printed JSON on stdout; diagnostics go to stderr
//! through `tracing`. All inputs are untrusted and validated before use.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use comply_config::ComplyConfig;
use comply_config::ConfigError;
use comply_core::AssessorId;
use comply_core::AssetId;
use comply_core::AssetType;
use comply_core::ComplianceListFilter;
use comply_core::ComplianceRequirement;
use comply_core::ComplianceStatus;
use comply_core::FrameworkId;
use comply_core::PageRequest;
use comply_core::RequirementId;
use comply_core::RuleDraft;
use comply_core::RuleFilter;
use comply_core::RuleId;
use comply_core::RulePatch;
use comply_core::ValidationLogic;
use comply_core::runtime::AssessmentEngine;
use comply_core::runtime::EngineError;
use comply_providers::JsonFileAssetDirectory;
use comply_providers::SystemClock;
use comply_store_sqlite::SqliteComplianceStore;
use comply_store_sqlite::SqliteStoreError;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a validation logic document read from disk.
const MAX_LOGIC_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "comply", version, about = "Rule-based compliance assessment")]
struct Cli {
    /// Path to the host config file (defaults to comply.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Manage validation rules.
    #[command(subcommand)]
    Rule(RuleCommand),
    /// Manage compliance requirements.
    #[command(subcommand)]
    Requirement(RequirementCommand),
    /// Run assessments.
    #[command(subcommand)]
    Assess(AssessCommand),
    /// Show the aggregate compliance status for one asset.
    Status(AssetSelector),
    /// Show compliance gaps for one asset.
    Gaps(AssetSelector),
    /// List per-asset compliance across the estate.
    List(ListArgs),
}

/// Selects one asset by type and identifier.
#[derive(Args, Debug)]
struct AssetSelector {
    /// Asset type (physical, information, application, software, supplier).
    #[arg(long)]
    asset_type: AssetType,
    /// Asset identifier.
    #[arg(long)]
    asset_id: String,
}

/// Validation rule commands.
#[derive(Subcommand, Debug)]
enum RuleCommand {
    /// Create a validation rule.
    Create(RuleCreateArgs),
    /// List validation rules.
    List(RuleListArgs),
    /// Show one validation rule.
    Show(RuleIdArg),
    /// Update fields of a validation rule.
    Update(RuleUpdateArgs),
    /// Delete a validation rule.
    Delete(RuleIdArg),
}

/// Arguments for rule creation.
#[derive(Args, Debug)]
struct RuleCreateArgs {
    /// Identifier for the new rule.
    #[arg(long)]
    id: String,
    /// Requirement the rule checks.
    #[arg(long)]
    requirement: String,
    /// Asset type the rule applies to.
    #[arg(long)]
    asset_type: AssetType,
    /// Human-readable rule name.
    #[arg(long)]
    name: String,
    /// Optional rule description.
    #[arg(long)]
    description: Option<String>,
    /// Path to the validation logic JSON document.
    #[arg(long)]
    logic: PathBuf,
    /// Evaluation priority (defaults to 0).
    #[arg(long)]
    priority: Option<i32>,
    /// Active flag (defaults to true).
    #[arg(long)]
    active: Option<bool>,
    /// Assessor recorded as the rule creator.
    #[arg(long)]
    created_by: String,
}

/// Arguments for rule listing.
#[derive(Args, Debug)]
struct RuleListArgs {
    /// Restrict to rules of one requirement.
    #[arg(long)]
    requirement: Option<String>,
    /// Restrict to rules of one asset type.
    #[arg(long)]
    asset_type: Option<AssetType>,
}

/// Argument carrying one rule identifier.
#[derive(Args, Debug)]
struct RuleIdArg {
    /// Rule identifier.
    #[arg(long)]
    id: String,
}

/// Arguments for rule updates; omitted fields keep their stored values.
#[derive(Args, Debug)]
struct RuleUpdateArgs {
    /// Rule identifier.
    #[arg(long)]
    id: String,
    /// Replacement rule name.
    #[arg(long)]
    name: Option<String>,
    /// Replacement rule description.
    #[arg(long)]
    description: Option<String>,
    /// Path to a replacement validation logic JSON document.
    #[arg(long)]
    logic: Option<PathBuf>,
    /// Replacement priority.
    #[arg(long)]
    priority: Option<i32>,
    /// Replacement active flag.
    #[arg(long)]
    active: Option<bool>,
}

/// Requirement commands.
#[derive(Subcommand, Debug)]
enum RequirementCommand {
    /// Insert or replace a requirement.
    Add(RequirementAddArgs),
    /// List all stored requirements.
    List,
}

/// Arguments for requirement upserts.
#[derive(Args, Debug)]
struct RequirementAddArgs {
    /// Requirement identifier.
    #[arg(long)]
    id: String,
    /// Framework the requirement belongs to.
    #[arg(long)]
    framework: String,
    /// Short requirement code, e.g. a control number.
    #[arg(long)]
    code: String,
    /// Human-readable requirement title.
    #[arg(long)]
    title: String,
    /// Optional requirement description.
    #[arg(long)]
    description: Option<String>,
}

/// Assessment commands.
#[derive(Subcommand, Debug)]
enum AssessCommand {
    /// Assess one asset against one requirement.
    Requirement(AssessRequirementArgs),
    /// Assess one asset against all linked requirements.
    Asset(AssessAssetArgs),
    /// Assess several assets of one type sequentially.
    Bulk(AssessBulkArgs),
}

/// Arguments for a single-requirement assessment.
#[derive(Args, Debug)]
struct AssessRequirementArgs {
    /// Asset selection.
    #[command(flatten)]
    asset: AssetSelector,
    /// Requirement identifier.
    #[arg(long)]
    requirement: String,
    /// Assessor recorded on the run.
    #[arg(long)]
    assessed_by: Option<String>,
}

/// Arguments for a whole-asset assessment.
#[derive(Args, Debug)]
struct AssessAssetArgs {
    /// Asset selection.
    #[command(flatten)]
    asset: AssetSelector,
    /// Assessor recorded on the run.
    #[arg(long)]
    assessed_by: Option<String>,
}

/// Arguments for a bulk assessment.
#[derive(Args, Debug)]
struct AssessBulkArgs {
    /// Asset type shared by all assets.
    #[arg(long)]
    asset_type: AssetType,
    /// Comma-separated asset identifiers.
    #[arg(long, value_delimiter = ',')]
    asset_ids: Vec<String>,
    /// Assessor recorded on the runs.
    #[arg(long)]
    assessed_by: Option<String>,
}

/// Arguments for the compliance list view.
#[derive(Args, Debug)]
struct ListArgs {
    /// Restrict to mappings of one asset type.
    #[arg(long)]
    asset_type: Option<AssetType>,
    /// Restrict to mappings holding one status.
    #[arg(long)]
    status: Option<ComplianceStatus>,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Rows per page.
    #[arg(long, default_value_t = 20)]
    page_size: usize,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure modes surfaced to the operator.
#[derive(Debug, Error)]
enum CliError {
    /// Config loading or validation failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Store open failed.
    #[error("store error: {0}")]
    Store(#[from] SqliteStoreError),
    /// Engine operation failed.
    #[error("{0}")]
    Engine(#[from] EngineError),
    /// CLI input was unusable.
    #[error("input error: {0}")]
    Input(String),
    /// Result serialization failed.
    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Engine assembled from the configured host collaborators.
type CliEngine = AssessmentEngine<
    JsonFileAssetDirectory,
    SystemClock,
    SqliteComplianceStore,
    SqliteComplianceStore,
    SqliteComplianceStore,
>;

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report_error(&error);
            ExitCode::FAILURE
        }
    }
}

/// Loads config, wires collaborators, and dispatches the command.
fn run(cli: Cli) -> Result<(), CliError> {
    let config = ComplyConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging.filter);

    let store = SqliteComplianceStore::new(&config.store)?;
    let engine = AssessmentEngine::new(
        JsonFileAssetDirectory::new(config.assets.document.clone()),
        SystemClock::new(),
        store.clone(),
        store.clone(),
        store.clone(),
    );

    match cli.command {
        Command::Rule(command) => run_rule(&engine, command),
        Command::Requirement(command) => run_requirement(&store, command),
        Command::Assess(command) => run_assess(&engine, command),
        Command::Status(selector) => {
            let report = engine
                .asset_compliance_status(selector.asset_type, &AssetId::new(selector.asset_id))?;
            emit(&report)
        }
        Command::Gaps(selector) => {
            let gaps =
                engine.compliance_gaps(selector.asset_type, &AssetId::new(selector.asset_id))?;
            emit(&gaps)
        }
        Command::List(args) => {
            let list = engine.asset_compliance_list(
                &ComplianceListFilter {
                    asset_type: args.asset_type,
                    status: args.status,
                },
                PageRequest {
                    page: args.page,
                    page_size: args.page_size,
                },
            )?;
            emit(&list)
        }
    }
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Executes rule administration commands.
fn run_rule(engine: &CliEngine, command: RuleCommand) -> Result<(), CliError> {
    match command {
        RuleCommand::Create(args) => {
            let logic = read_logic(&args.logic)?;
            let view = engine.create_validation_rule(
                RuleDraft {
                    rule_id: RuleId::new(args.id),
                    requirement_id: RequirementId::new(args.requirement),
                    asset_type: args.asset_type,
                    rule_name: args.name,
                    rule_description: args.description,
                    logic,
                    priority: args.priority,
                    active: args.active,
                },
                &AssessorId::new(args.created_by),
            )?;
            tracing::info!(rule_id = %view.rule_id, "created validation rule");
            emit(&view)
        }
        RuleCommand::List(args) => {
            let views = engine.list_validation_rules(&RuleFilter {
                requirement_id: args.requirement.map(RequirementId::new),
                asset_type: args.asset_type,
            })?;
            emit(&views)
        }
        RuleCommand::Show(args) => {
            let view = engine.find_validation_rule(&RuleId::new(args.id))?;
            emit(&view)
        }
        RuleCommand::Update(args) => {
            let logic = args.logic.as_deref().map(read_logic).transpose()?;
            let view = engine.update_validation_rule(
                &RuleId::new(args.id),
                RulePatch {
                    rule_name: args.name,
                    rule_description: args.description.map(Some),
                    logic,
                    priority: args.priority,
                    active: args.active,
                },
            )?;
            tracing::info!(rule_id = %view.rule_id, "updated validation rule");
            emit(&view)
        }
        RuleCommand::Delete(args) => {
            let rule_id = RuleId::new(args.id);
            engine.delete_validation_rule(&rule_id)?;
            tracing::info!(rule_id = %rule_id, "deleted validation rule");
            emit(&serde_json::json!({ "deleted": rule_id }))
        }
    }
}

/// Executes requirement commands against the store.
fn run_requirement(
    store: &SqliteComplianceStore,
    command: RequirementCommand,
) -> Result<(), CliError> {
    match command {
        RequirementCommand::Add(args) => {
            let requirement = ComplianceRequirement {
                requirement_id: RequirementId::new(args.id),
                framework_id: FrameworkId::new(args.framework),
                code: args.code,
                title: args.title,
                description: args.description,
            };
            store.put_requirement(&requirement)?;
            tracing::info!(requirement_id = %requirement.requirement_id, "stored requirement");
            emit(&requirement)
        }
        RequirementCommand::List => {
            let requirements = store.list_requirements()?;
            emit(&requirements)
        }
    }
}

/// Executes assessment commands.
fn run_assess(engine: &CliEngine, command: AssessCommand) -> Result<(), CliError> {
    match command {
        AssessCommand::Requirement(args) => {
            let result = engine.assess_asset_requirement(
                args.asset.asset_type,
                &AssetId::new(args.asset.asset_id),
                &RequirementId::new(args.requirement),
                args.assessed_by.map(AssessorId::new).as_ref(),
            )?;
            tracing::info!(status = %result.status, "recorded assessment");
            emit(&result)
        }
        AssessCommand::Asset(args) => {
            let results = engine.assess_asset(
                args.asset.asset_type,
                &AssetId::new(args.asset.asset_id),
                args.assessed_by.map(AssessorId::new).as_ref(),
            )?;
            tracing::info!(count = results.len(), "recorded assessments");
            emit(&results)
        }
        AssessCommand::Bulk(args) => {
            if args.asset_ids.is_empty() {
                return Err(CliError::Input("asset_ids must not be empty".to_string()));
            }
            let asset_ids: Vec<AssetId> = args.asset_ids.into_iter().map(AssetId::new).collect();
            let outcome = engine.bulk_assess(
                args.asset_type,
                &asset_ids,
                args.assessed_by.map(AssessorId::new).as_ref(),
            );
            tracing::info!(
                successful = outcome.successful,
                failed = outcome.failed,
                "bulk assessment finished"
            );
            emit(&outcome)
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads and parses a validation logic document with a size guard.
fn read_logic(path: &std::path::Path) -> Result<ValidationLogic, CliError> {
    let metadata = fs::metadata(path)
        .map_err(|err| CliError::Input(format!("logic file unreadable: {err}")))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > MAX_LOGIC_BYTES {
        return Err(CliError::Input(format!(
            "logic file exceeds size limit: {size} bytes (max {MAX_LOGIC_BYTES})"
        )));
    }
    let text = fs::read_to_string(path)
        .map_err(|err| CliError::Input(format!("logic file unreadable: {err}")))?;
    serde_json::from_str(&text)
        .map_err(|err| CliError::Input(format!("logic file unparseable: {err}")))
}

/// Initializes stderr tracing with the configured filter directive.
fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Writes one JSON document to stdout.
#[allow(clippy::print_stdout, reason = "JSON results on stdout are the CLI contract.")]
fn emit<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|err| CliError::Output(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

/// Reports a fatal error on stderr.
#[allow(clippy::print_stderr, reason = "Fatal errors are reported on stderr.")]
fn report_error(error: &CliError) {
    eprintln!("error: {error}");
}
