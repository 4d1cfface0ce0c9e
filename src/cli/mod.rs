//! Command implementations behind the binary surface.
//!
//! Each command resolves the catalogue, runs inside one transaction and
//! prints its own output. Non-fatal problems (unknown names in a query, an
//! absent tagging on untag) are painted as warnings on stderr; the command
//! still completes.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use nu_ansi_term::Color::Yellow;
use rusqlite::Transaction;
use tracing::{debug, info};

use crate::config::{self, Settings};
use crate::error::{Error, Result};
use crate::model::{self, Tag, TagValuePair, Value, NO_VALUE_ID};
use crate::query::{self, CompileOptions};
use crate::storage::{file, filetag, implication, tag, value, Database, FileSort};

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One entry per line.
    #[default]
    Text,
    /// A JSON array.
    Json,
}

/// Options for the `files` command.
#[derive(Debug, Default)]
pub struct FilesOptions {
    /// List only items at or under this path.
    pub path: Option<PathBuf>,
    /// Match explicit taggings only; ignore implications.
    pub explicit_only: bool,
    /// Ignore the case of tag and value names.
    pub ignore_case: bool,
    /// Result ordering; falls back to the configured default.
    pub sort: Option<FileSort>,
    /// List only directories.
    pub directories_only: bool,
    /// List only regular files.
    pub files_only: bool,
    /// Print the number of matches rather than their paths.
    pub count: bool,
    /// Delimit entries with NUL instead of newline.
    pub print0: bool,
    /// Output format.
    pub format: OutputFormat,
}

/// Creates a new catalogue.
pub fn init(database: Option<PathBuf>) -> Result<()> {
    let path = match database {
        Some(path) => path,
        None => config::default_database_path()?,
    };

    Database::create(&path)?;
    println!("initialised catalogue at '{}'", path.display());
    Ok(())
}

/// Applies taggings to a file, creating tags and values on demand.
pub fn tag_file(database: Option<PathBuf>, path: &Path, taggings: &[String]) -> Result<()> {
    let parsed = parse_taggings(taggings)?;

    let (directory, name) = split_path(path)?;
    let (mod_time, size, is_dir) = file_metadata(path)?;

    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let file_row = match file::file_by_path(&tx, &directory, &name)? {
        Some(row) => row,
        None => file::insert_file(&tx, &directory, &name, mod_time, size, is_dir)?,
    };

    for (tag_name, value_name) in &parsed {
        let pair = ensure_pair(&tx, tag_name, value_name.as_deref())?;
        filetag::insert_file_tag(&tx, file_row.id, pair.tag_id, pair.value_id)?;
    }

    tx.commit()?;
    info!(path = %path.display(), taggings = parsed.len(), "file tagged");
    Ok(())
}

/// Removes taggings from a file; the file row itself is dropped once no
/// tagging references it.
pub fn untag_file(database: Option<PathBuf>, path: &Path, taggings: &[String]) -> Result<()> {
    let parsed = parse_taggings(taggings)?;

    let (directory, name) = split_path(path)?;

    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let file_row = file::file_by_path(&tx, &directory, &name)?
        .ok_or_else(|| Error::NoSuchFile(path.display().to_string()))?;

    for (tag_name, value_name) in &parsed {
        let pair = require_pair(&tx, tag_name, value_name.as_deref())?;
        if !filetag::delete_file_tag(&tx, file_row.id, pair.tag_id, pair.value_id)? {
            warn_user(&format!(
                "file '{}' is not tagged '{}'",
                path.display(),
                render_tagging_argument(tag_name, value_name.as_deref())
            ));
        }
    }

    file::delete_file_if_untagged(&tx, file_row.id)?;

    tx.commit()?;
    Ok(())
}

/// Lists the files matching a query.
pub fn files(database: Option<PathBuf>, query_text: &str, options: &FilesOptions) -> Result<()> {
    let database_path = config::resolve_database(database)?;
    let settings = Settings::load(&database_path)?;
    let ignore_case = options.ignore_case || settings.ignore_case;
    let sort = options.sort.unwrap_or(settings.sort);

    debug!("parsing query");
    let expression = query::parse(query_text)?;

    let mut db = Database::open(&database_path)?;
    let tx = db.transaction()?;

    debug!("checking tag and value names");
    warn_unknown_names(&tx, &expression, ignore_case)?;

    let compile_options = CompileOptions {
        explicit_only: options.explicit_only,
        ignore_case,
    };
    let scope = match &options.path {
        Some(path) => Some(absolute(path)?),
        None => None,
    };

    info!("querying catalogue");

    if options.count && !options.directories_only && !options.files_only {
        let count =
            file::file_count_for_query(&tx, &expression, scope.as_deref(), compile_options)?;
        println!("{count}");
        return Ok(());
    }

    let matched = file::files_for_query(&tx, &expression, scope.as_deref(), compile_options, sort)?;
    let listed: Vec<_> = matched
        .iter()
        .filter(|f| !(options.files_only && f.is_dir) && !(options.directories_only && !f.is_dir))
        .collect();

    if options.count {
        println!("{}", listed.len());
        return Ok(());
    }

    match options.format {
        OutputFormat::Text => {
            for file_row in &listed {
                let path = display_path(&file_row.path());
                if options.print0 {
                    print!("{path}\0");
                } else {
                    println!("{path}");
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = listed
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "path": f.path(),
                        "modTime": f.mod_time,
                        "size": f.size,
                        "isDir": f.is_dir,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Lists all tags, or the tags on one file (implied taggings annotated).
pub fn tags(database: Option<PathBuf>, path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let lines = match path {
        None => tag::all_tags(&tx)?.into_iter().map(|t| t.name).collect(),
        Some(path) => file_tag_lines(&tx, path)?,
    };

    match format {
        OutputFormat::Text => {
            for line in &lines {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
    }

    Ok(())
}

/// Lists all values, or the values in use with one tag.
pub fn values(database: Option<PathBuf>, tag_name: Option<&str>) -> Result<()> {
    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let values = match tag_name {
        None => value::all_values(&tx)?,
        Some(name) => {
            let tag_row = tag::tag_by_name(&tx, name, false)?
                .ok_or_else(|| Error::NoSuchTag(name.to_owned()))?;
            value::values_by_tag_id(&tx, tag_row.id)?
        }
    };

    for value_row in values {
        println!("{}", value_row.name);
    }

    Ok(())
}

/// Lists the stored implication edges.
pub fn imply_list(database: Option<PathBuf>) -> Result<()> {
    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    for edge in implication::implications(&tx)? {
        println!(
            "{} -> {}",
            render_pair(&edge.tag, edge.value.as_ref()),
            render_pair(&edge.implied_tag, edge.implied_value.as_ref())
        );
    }

    Ok(())
}

/// Adds an implication edge, creating the named tags and values on demand.
pub fn imply_add(database: Option<PathBuf>, source: &str, implied: &str) -> Result<()> {
    let (source_tag, source_value) = parse_tagging(source)?;
    let (implied_tag, implied_value) = parse_tagging(implied)?;
    validate_tagging(&source_tag, source_value.as_deref())?;
    validate_tagging(&implied_tag, implied_value.as_deref())?;

    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let source_pair = ensure_pair(&tx, &source_tag, source_value.as_deref())?;
    let implied_pair = ensure_pair(&tx, &implied_tag, implied_value.as_deref())?;
    implication::add_implication(&tx, source_pair, implied_pair)?;

    tx.commit()?;
    Ok(())
}

/// Removes an implication edge.
pub fn imply_delete(database: Option<PathBuf>, source: &str, implied: &str) -> Result<()> {
    let (source_tag, source_value) = parse_tagging(source)?;
    let (implied_tag, implied_value) = parse_tagging(implied)?;

    let mut db = open_database(database)?;
    let tx = db.transaction()?;

    let source_pair = require_pair(&tx, &source_tag, source_value.as_deref())?;
    let implied_pair = require_pair(&tx, &implied_tag, implied_value.as_deref())?;
    implication::delete_implication(&tx, source_pair, implied_pair)?;

    tx.commit()?;
    Ok(())
}

// helpers

fn open_database(database: Option<PathBuf>) -> Result<Database> {
    let path = config::resolve_database(database)?;
    Database::open(&path)
}

fn warn_user(message: &str) {
    eprintln!("{}", Yellow.paint(format!("warning: {message}")));
}

/// Emits a warning for every name the expression references that the
/// catalogue does not contain. Matches on such names simply match nothing,
/// so the query still runs.
fn warn_unknown_names(
    tx: &Transaction,
    expression: &query::Expression,
    ignore_case: bool,
) -> Result<()> {
    let tag_names = expression.tag_names();
    let known_tags = tag::tags_by_names(tx, &tag_names, ignore_case)?;
    for name in &tag_names {
        if let Err(error) = model::validate_tag_name(name) {
            warn_user(&error.to_string());
            continue;
        }
        if !known_tags
            .iter()
            .any(|t| names_match(&t.name, name, ignore_case))
        {
            warn_user(&format!("no such tag '{name}'"));
        }
    }

    let value_names = expression.value_names();
    let known_values = value::values_by_names(tx, &value_names, ignore_case)?;
    for name in &value_names {
        if let Err(error) = model::validate_value_name(name) {
            warn_user(&error.to_string());
            continue;
        }
        if !known_values
            .iter()
            .any(|v| names_match(&v.name, name, ignore_case))
        {
            warn_user(&format!("no such value '{name}'"));
        }
    }

    Ok(())
}

fn names_match(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

/// Splits a `TAG` or `TAG=VALUE` argument, honoring backslash escapes.
fn parse_tagging(argument: &str) -> Result<(String, Option<String>)> {
    let mut name = String::new();
    let mut value = String::new();
    let mut in_value = false;

    let mut chars = argument.chars();
    while let Some(ch) = chars.next() {
        let target = if in_value { &mut value } else { &mut name };
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => target.push(escaped),
                None => {
                    return Err(Error::InvalidArgument(format!(
                        "trailing escape in '{argument}'"
                    )))
                }
            },
            '=' if !in_value => in_value = true,
            ch => target.push(ch),
        }
    }

    Ok((name, in_value.then_some(value)))
}

fn parse_taggings(arguments: &[String]) -> Result<Vec<(String, Option<String>)>> {
    let parsed = arguments
        .iter()
        .map(|argument| parse_tagging(argument))
        .collect::<Result<Vec<_>>>()?;

    for (name, value) in &parsed {
        validate_tagging(name, value.as_deref())?;
    }

    Ok(parsed)
}

fn validate_tagging(tag_name: &str, value_name: Option<&str>) -> Result<()> {
    model::validate_tag_name(tag_name)?;
    if let Some(value_name) = value_name {
        model::validate_value_name(value_name)?;
    }
    Ok(())
}

fn render_tagging_argument(tag_name: &str, value_name: Option<&str>) -> String {
    match value_name {
        Some(value_name) => format!("{tag_name}={value_name}"),
        None => tag_name.to_owned(),
    }
}

fn render_pair(tag_row: &Tag, value_row: Option<&Value>) -> String {
    match value_row {
        Some(value_row) => format!("{}={}", tag_row.name, value_row.name),
        None => tag_row.name.clone(),
    }
}

/// Looks up the ids for a tagging, creating missing tags and values.
fn ensure_pair(tx: &Transaction, tag_name: &str, value_name: Option<&str>) -> Result<TagValuePair> {
    let tag_row = match tag::tag_by_name(tx, tag_name, false)? {
        Some(row) => row,
        None => {
            info!(name = %tag_name, "new tag");
            tag::insert_tag(tx, tag_name)?
        }
    };

    let value_id = match value_name {
        Some(value_name) => match value::value_by_name(tx, value_name, false)? {
            Some(row) => row.id,
            None => value::insert_value(tx, value_name)?.id,
        },
        None => NO_VALUE_ID,
    };

    Ok(TagValuePair::new(tag_row.id, value_id))
}

/// Looks up the ids for a tagging, failing on missing names.
fn require_pair(
    tx: &Transaction,
    tag_name: &str,
    value_name: Option<&str>,
) -> Result<TagValuePair> {
    let tag_row = tag::tag_by_name(tx, tag_name, false)?
        .ok_or_else(|| Error::NoSuchTag(tag_name.to_owned()))?;

    let value_id = match value_name {
        Some(value_name) => {
            value::value_by_name(tx, value_name, false)?
                .ok_or_else(|| Error::NoSuchValue(value_name.to_owned()))?
                .id
        }
        None => NO_VALUE_ID,
    };

    Ok(TagValuePair::new(tag_row.id, value_id))
}

/// The explicit taggings of a file followed by the implied ones, rendered
/// for display.
fn file_tag_lines(tx: &Transaction, path: &Path) -> Result<Vec<String>> {
    let (directory, name) = split_path(path)?;
    let file_row = file::file_by_path(tx, &directory, &name)?
        .ok_or_else(|| Error::NoSuchFile(path.display().to_string()))?;

    let file_tags = filetag::file_tags_by_file_id(tx, file_row.id)?;
    let explicit: Vec<TagValuePair> = file_tags
        .iter()
        .map(|ft| TagValuePair::new(ft.tag_id, ft.value_id))
        .collect();

    let mut lines = Vec::new();
    for pair in &explicit {
        lines.push(render_pair_by_ids(tx, *pair)?);
    }

    let explicit_set: HashSet<TagValuePair> = explicit.iter().copied().collect();
    let mut implied_seen = HashSet::new();
    for edge in implication::implications_for(tx, &explicit)? {
        let implied = edge.implied_pair();
        if explicit_set.contains(&implied) || !implied_seen.insert(implied) {
            continue;
        }
        lines.push(format!(
            "{} (implied)",
            render_pair(&edge.implied_tag, edge.implied_value.as_ref())
        ));
    }

    Ok(lines)
}

fn render_pair_by_ids(tx: &Transaction, pair: TagValuePair) -> Result<String> {
    let tag_row = tag::tag_by_id(tx, pair.tag_id)?
        .ok_or_else(|| Error::NoSuchTag(pair.tag_id.to_string()))?;

    if pair.value_id == NO_VALUE_ID {
        return Ok(tag_row.name);
    }

    let value_row = value::value_by_id(tx, pair.value_id)?
        .ok_or_else(|| Error::NoSuchValue(pair.value_id.to_string()))?;
    Ok(format!("{}={}", tag_row.name, value_row.name))
}

fn split_path(path: &Path) -> Result<(String, String)> {
    let canonical = fs::canonicalize(path)?;
    let directory = canonical
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_owned());
    let name = canonical
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidArgument(format!("cannot tag '{}'", path.display())))?;
    Ok((directory, name))
}

fn file_metadata(path: &Path) -> Result<(i64, i64, bool)> {
    let metadata = fs::metadata(path)?;
    // pre-epoch times clamp to zero
    let mod_time = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok((mod_time, metadata.len() as i64, metadata.is_dir()))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

fn display_path(path: &Path) -> String {
    match env::current_dir() {
        Ok(cwd) => match path.strip_prefix(&cwd) {
            Ok(relative) if relative.as_os_str().is_empty() => ".".into(),
            Ok(relative) => relative.to_string_lossy().into_owned(),
            Err(_) => path.to_string_lossy().into_owned(),
        },
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
