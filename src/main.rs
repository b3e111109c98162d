//! chip-order CLI
//!
//! Reads a JSON array of feedback templates and prints them in grouped
//! display order, or reports what is wrong with their hierarchy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use chip_order::editor::{
    filter_templates, matches_filter, parent_chip_text, templates_for_outcome, validate_template,
};
use chip_order::tree::{collapse, display_rows, render};
use chip_order::{
    ChipId, ChipOrderResolver, FeedbackTemplate, Hierarchy, HierarchyPolicy, KeyEncoding,
    ResolverConfig, SortDirection, SortField,
};
use rolling_logger::{LogConfig, LogRing};

#[derive(Parser)]
#[command(name = "chip-order")]
#[command(about = "Order feedback-template chips for grouped display", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write the most recent log lines to this file on exit
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// How many lines the log file keeps
    #[arg(long, global = true, default_value_t = rolling_logger::DEFAULT_CAPACITY)]
    log_lines: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print templates in resolved order
    Resolve(ResolveArgs),

    /// Report hierarchy problems; exits non-zero if there are any
    Check(CheckArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// JSON array of feedback templates
    #[arg(short, long)]
    input: PathBuf,

    /// Resolver config (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field for the primary comparator (chip-text, description, comment-text, summary-text)
    #[arg(long)]
    sort_field: Option<SortField>,

    /// Sort siblings descending
    #[arg(long)]
    desc: bool,

    /// Fail on orphans, cycles, leaf parents and duplicate ids
    #[arg(long)]
    strict: bool,

    /// Sort key encoding (rank-path, scaled)
    #[arg(long)]
    encoding: Option<KeyEncoding>,

    /// Only templates of this learning outcome
    #[arg(long)]
    outcome: Option<u32>,

    /// Keep templates whose texts (or parent's chip text) contain this
    #[arg(long)]
    filter: Option<String>,

    /// Print an indented outline instead of one id per line
    #[arg(long)]
    tree: bool,

    /// Groups whose contents are hidden in the outline
    #[arg(long, value_delimiter = ',', requires = "tree")]
    collapsed: Vec<ChipId>,
}

#[derive(Args)]
struct CheckArgs {
    /// JSON array of feedback templates
    #[arg(short, long)]
    input: PathBuf,

    /// Also check required fields of every template
    #[arg(long)]
    fields: bool,
}

/// Text printed by `check`, plus how many problems it lists
struct CheckReport {
    output: String,
    problems: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let ring = cli.log_file.as_ref().map(|_| LogRing::new(cli.log_lines));
    if let Err(e) = rolling_logger::init(LogConfig {
        verbose: cli.verbose,
        ring: ring.clone(),
    }) {
        eprintln!("warning: logging not initialised: {}", e);
    }

    let result = run(&cli.command);

    if let (Some(path), Some(ring)) = (&cli.log_file, &ring) {
        if let Err(e) = write_log(path, ring) {
            eprintln!("warning: {:#}", e);
        }
    }

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: &Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Resolve(args) => {
            print!("{}", resolve(args)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let report = check(args)?;
            print!("{}", report.output);
            if report.problems > 0 {
                tracing::warn!(problems = report.problems, "hierarchy check failed");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config file (or defaults) with the command-line overrides applied
fn build_config(args: &ResolveArgs) -> anyhow::Result<ResolverConfig> {
    let mut config = match &args.config {
        Some(path) => ResolverConfig::from_path(path)?,
        None => ResolverConfig::default(),
    };
    if let Some(field) = args.sort_field {
        config.sort.field = field;
    }
    if args.desc {
        config.sort.direction = SortDirection::Desc;
    }
    if args.strict {
        config.policy = HierarchyPolicy::Strict;
    }
    if let Some(encoding) = args.encoding {
        config.encoding = encoding;
    }
    Ok(config)
}

fn resolve(args: &ResolveArgs) -> anyhow::Result<String> {
    let config = build_config(args)?;

    let mut templates = load_templates(&args.input)?;
    if let Some(outcome_id) = args.outcome {
        templates = templates_for_outcome(&templates, outcome_id)
            .into_iter()
            .cloned()
            .collect();
    }

    let resolution = ChipOrderResolver::new(config)
        .resolve_detailed(&templates)
        .with_context(|| format!("resolving {}", args.input.display()))?;

    if args.tree {
        let collapsed: HashSet<ChipId> = args.collapsed.iter().copied().collect();
        let mut rows = collapse(&display_rows(&templates, &resolution), &collapsed);
        if let Some(filter) = &args.filter {
            rows.retain(|row| {
                let parent_text = parent_chip_text(row.chip.parent_chip_id, &templates);
                matches_filter(row.chip, parent_text, filter)
            });
        }
        return Ok(render(&rows));
    }

    let mut ordered = resolution.apply(&templates);
    if let Some(filter) = &args.filter {
        ordered = filter_templates(&ordered, &templates, filter);
    }
    let mut out = String::new();
    for template in ordered {
        out.push_str(&format!("{}\t{}\n", template.id, template.chip_text));
    }
    Ok(out)
}

fn check(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let templates = load_templates(&args.input)?;
    let hierarchy = Hierarchy::analyze(&templates);
    let mut report = CheckReport {
        output: String::new(),
        problems: 0,
    };

    for issue in hierarchy.issues() {
        report.output.push_str(&format!("{}\n", issue));
        report.problems += 1;
    }
    if args.fields {
        for (index, template) in templates.iter().enumerate() {
            if let Err(e) = validate_template(template) {
                report
                    .output
                    .push_str(&format!("chip {} (#{}): {}\n", template.id, index, e));
                report.problems += 1;
            }
        }
    }

    if report.problems == 0 {
        report.output = format!(
            "ok: {} chips, max group depth {}\n",
            templates.len(),
            hierarchy.max_group_depth()
        );
    }
    Ok(report)
}

fn load_templates(path: &Path) -> anyhow::Result<Vec<FeedbackTemplate>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let templates: Vec<FeedbackTemplate> = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(chips = templates.len(), path = %path.display(), "loaded templates");
    Ok(templates)
}

fn write_log(path: &Path, ring: &LogRing) -> anyhow::Result<()> {
    let mut contents = ring.lines().join("\n");
    contents.push('\n');
    std::fs::write(path, contents).with_context(|| format!("writing log to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// Outcome 1:
    /// 1 "B" (group)
    /// ├── 2 "A" (group)
    /// │   └── 3 "x"
    /// └── 4 "y"
    /// Outcome 2:
    /// 5 "A" (group)
    const TEMPLATES: &str = r#"[
        {"id": 1, "type": "group", "chip_text": "B", "description": "d", "learning_outcome_id": 1},
        {"id": 2, "type": "group", "chip_text": "A", "description": "d",
         "parent_chip_id": 1, "learning_outcome_id": 1},
        {"id": 3, "type": "template", "chip_text": "x", "description": "d",
         "comment_text": "c", "summary_text": "s", "parent_chip_id": 2, "learning_outcome_id": 1},
        {"id": 4, "type": "template", "chip_text": "y", "description": "d",
         "parent_chip_id": 1, "learning_outcome_id": 1},
        {"id": 5, "type": "group", "chip_text": "A", "description": "d", "learning_outcome_id": 2}
    ]"#;

    const ORPHAN: &str = r#"[
        {"id": 1, "type": "group", "chip_text": "b", "description": "d"},
        {"id": 2, "type": "template", "chip_text": "a", "description": "d",
         "comment_text": "c", "summary_text": "s", "parent_chip_id": 42}
    ]"#;

    fn setup_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write fixture");
        path.to_string_lossy().into_owned()
    }

    fn parse(args: &[&str]) -> Commands {
        let argv = std::iter::once("chip-order").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("Failed to parse args").command
    }

    fn resolve_args(args: &[&str]) -> ResolveArgs {
        match parse(&[&["resolve"][..], args].concat()) {
            Commands::Resolve(args) => args,
            Commands::Check(_) => panic!("expected resolve"),
        }
    }

    fn check_args(args: &[&str]) -> CheckArgs {
        match parse(&[&["check"][..], args].concat()) {
            Commands::Check(args) => args,
            Commands::Resolve(_) => panic!("expected check"),
        }
    }

    fn ids(output: &str) -> Vec<u32> {
        output
            .lines()
            .map(|line| line.split('\t').next().unwrap().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_resolve_default_order() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        let output = resolve(&resolve_args(&["--input", &input])).unwrap();
        assert_eq!(output, "5\tA\n1\tB\n2\tA\n3\tx\n4\ty\n");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);
        let config = write_file(
            &dir,
            "config.json",
            r#"{"sort": {"field": "description"}, "policy": "lenient", "encoding": "rank-path"}"#,
        );

        let from_file = build_config(&resolve_args(&["-i", &input, "-c", &config])).unwrap();
        assert_eq!(from_file.sort.field, SortField::Description);
        assert_eq!(from_file.policy, HierarchyPolicy::Lenient);

        let overridden = build_config(&resolve_args(&[
            "-i",
            &input,
            "-c",
            &config,
            "--sort-field",
            "chip-text",
            "--desc",
            "--strict",
            "--encoding",
            "scaled",
        ]))
        .unwrap();
        assert_eq!(overridden.sort.field, SortField::ChipText);
        assert_eq!(overridden.sort.direction, SortDirection::Desc);
        assert_eq!(overridden.policy, HierarchyPolicy::Strict);
        assert_eq!(overridden.encoding, KeyEncoding::Scaled);
    }

    #[test]
    fn test_resolve_with_flags() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        let desc = resolve(&resolve_args(&["-i", &input, "--desc"])).unwrap();
        assert_eq!(ids(&desc), vec![1, 4, 2, 3, 5]);

        let scaled = resolve(&resolve_args(&["-i", &input, "--encoding", "scaled"])).unwrap();
        assert_eq!(ids(&scaled), vec![5, 1, 4, 2, 3]);
    }

    #[test]
    fn test_outcome_scopes_before_resolving() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        let output = resolve(&resolve_args(&["-i", &input, "--outcome", "1"])).unwrap();
        assert_eq!(ids(&output), vec![1, 2, 3, 4]);

        let other = resolve(&resolve_args(&["-i", &input, "--outcome", "2"])).unwrap();
        assert_eq!(ids(&other), vec![5]);
    }

    #[test]
    fn test_filter_keeps_resolved_order() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        // "b" matches group 1 itself and, through its parent text, chips 2 and 4
        let output = resolve(&resolve_args(&["-i", &input, "--filter", " B "])).unwrap();
        assert_eq!(ids(&output), vec![1, 2, 4]);
    }

    #[test]
    fn test_tree_with_collapsed_and_filter() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        let tree = resolve(&resolve_args(&["-i", &input, "--tree"])).unwrap();
        assert_eq!(
            tree,
            "+ A (#5)\n+ B (#1)\n  + A (#2)\n    - x (#3)\n  - y (#4)\n"
        );

        let collapsed =
            resolve(&resolve_args(&["-i", &input, "--tree", "--collapsed", "2,5"])).unwrap();
        assert_eq!(collapsed, "+ A (#5)\n+ B (#1)\n  + A (#2)\n  - y (#4)\n");

        let filtered = resolve(&resolve_args(&[
            "-i",
            &input,
            "--tree",
            "--collapsed",
            "2",
            "--filter",
            "a",
        ]))
        .unwrap();
        assert_eq!(filtered, "+ A (#5)\n  + A (#2)\n");
    }

    #[test]
    fn test_collapsed_requires_tree() {
        let argv = ["chip-order", "resolve", "-i", "t.json", "--collapsed", "1"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_strict_resolve_fails_with_context() {
        let dir = setup_dir();
        let input = write_file(&dir, "orphan.json", ORPHAN);

        let lenient = resolve(&resolve_args(&["-i", &input])).unwrap();
        assert_eq!(ids(&lenient), vec![2, 1]);

        let err = resolve(&resolve_args(&["-i", &input, "--strict"])).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with(&format!("resolving {}", input)), "{}", message);
        assert!(message.contains("Malformed hierarchy at chip 2"), "{}", message);
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = setup_dir();
        let missing = dir.path().join("missing.json");
        let err = load_templates(&missing).unwrap_err();
        assert!(format!("{:#}", err).starts_with(&format!("reading {}", missing.display())));

        let broken = write_file(&dir, "broken.json", "[{\"id\": 1");
        let err = load_templates(Path::new(&broken)).unwrap_err();
        assert!(format!("{:#}", err).starts_with(&format!("parsing {}", broken)));
    }

    #[test]
    fn test_check_reports_problems() {
        let dir = setup_dir();
        let orphan = write_file(&dir, "orphan.json", ORPHAN);

        let report = check(&check_args(&["-i", &orphan])).unwrap();
        assert_eq!(report.problems, 1);
        assert_eq!(report.output, "chip 2 (#1): parent 42 not found\n");
    }

    #[test]
    fn test_check_fields() {
        let dir = setup_dir();
        let input = write_file(&dir, "templates.json", TEMPLATES);

        let report = check(&check_args(&["-i", &input])).unwrap();
        assert_eq!(report.problems, 0);
        assert_eq!(report.output, "ok: 5 chips, max group depth 1\n");

        // template 4 has no comment text
        let report = check(&check_args(&["-i", &input, "--fields"])).unwrap();
        assert_eq!(report.problems, 1);
        assert!(report.output.starts_with("chip 4 (#3): "), "{}", report.output);
    }
}
