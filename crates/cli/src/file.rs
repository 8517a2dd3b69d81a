use crate::{CursorArgs, print_json};
use cljscope_api::{Analyzer, ClojureAnalysis, Cursor, Direction, SexpNavigation, SourceBuffer};
use cljscope_core::project::source::read_buffer;
use std::path::Path;
use tracing::info;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn load(path: &Path) -> Result<SourceBuffer, Box<dyn std::error::Error>> {
    let buffer = read_buffer(path)?;
    info!("Loaded {} ({} bytes)", path.display(), buffer.len());
    Ok(buffer)
}

fn cursor(args: CursorArgs) -> Cursor {
    Cursor::new(args.line, args.column)
}

pub fn forms(analyzer: &dyn Analyzer, path: &Path) -> CmdResult {
    print_json(&analyzer.forms(&load(path)?)?)
}

pub fn functions(analyzer: &dyn Analyzer, path: &Path, pattern: Option<&str>) -> CmdResult {
    print_json(&analyzer.extract_functions(&load(path)?, pattern)?)
}

pub fn namespace(analyzer: &dyn Analyzer, path: &Path, all: bool) -> CmdResult {
    let buffer = load(path)?;
    if all {
        print_json(&analyzer.extract_namespaces(&buffer)?)
    } else {
        print_json(&analyzer.extract_namespace(&buffer)?)
    }
}

pub fn macros(analyzer: &dyn Analyzer, path: &Path, pattern: Option<&str>) -> CmdResult {
    print_json(&analyzer.extract_macros(&load(path)?, pattern)?)
}

pub fn types(analyzer: &dyn Analyzer, path: &Path, pattern: Option<&str>) -> CmdResult {
    print_json(&analyzer.extract_types(&load(path)?, pattern)?)
}

pub fn calls(analyzer: &dyn Analyzer, path: &Path, target: Option<&str>) -> CmdResult {
    print_json(&analyzer.trace_calls(&load(path)?, target)?)
}

pub fn locate(analyzer: &dyn Analyzer, path: &Path, args: CursorArgs) -> CmdResult {
    print_json(&analyzer.locate_enclosing_form(&load(path)?, cursor(args))?)
}

pub fn navigate(
    analyzer: &dyn Analyzer,
    path: &Path,
    args: CursorArgs,
    direction: Direction,
) -> CmdResult {
    print_json(&analyzer.navigate(&load(path)?, cursor(args), direction)?)
}

pub fn matching(analyzer: &dyn Analyzer, path: &Path, args: CursorArgs) -> CmdResult {
    print_json(&analyzer.find_matching_delimiter(&load(path)?, cursor(args))?)
}

pub fn idioms(analyzer: &dyn Analyzer, path: &Path, kinds: &[String]) -> CmdResult {
    let report = analyzer.classify_idioms(&load(path)?, kinds)?;
    for unsupported in &report.unsupported {
        tracing::warn!("{}: {}", unsupported.requested, unsupported.reason);
    }
    print_json(&report)
}

pub fn summary(analyzer: &dyn Analyzer, path: &Path) -> CmdResult {
    print_json(&analyzer.summarize_idioms(&load(path)?)?)
}

pub fn complexity(analyzer: &dyn Analyzer, path: &Path) -> CmdResult {
    print_json(&analyzer.analyze_complexity(&load(path)?)?)
}

pub fn inspect(analyzer: &dyn Analyzer, path: &Path, args: CursorArgs) -> CmdResult {
    print_json(&analyzer.inspect_form(&load(path)?, cursor(args))?)
}
