//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::backends::gtags::GtagsQuery;
use crate::core::builder::{DEFAULT_MAX_CODE_WIDTH, DEFAULT_MAX_PATH_WIDTH};
use crate::core::model::Layout;
use crate::core::pipeline::PipelineConfig;
use crate::core::render::{Delimiter, OutputFormat, RenderConfig};

/// neotags - exact tag lookup rendered for fuzzy pickers.
#[derive(Parser, Debug)]
#[command(name = "neotags")]
#[command(
    author,
    version,
    about,
    long_about = r#"neotags looks up tags in ctags/gtags indexes, resolves each match to a
line of code, and prints one aligned, colorized line per match.

Every output line is:

    <path><D><address><D><display>

where <D> is a tab (default) or NUL (--delimiter nul). The first two fields are
plain text, so a picker can split them off without parsing ANSI sequences.

Examples:
    neotags search main tags | fzf --ansi --delimiter '\t' --with-nth 3..
    neotags list src/main.c
    neotags gtags .gtags -- -d main
    readtags -t tags main | neotags render
"#
)]
pub struct Cli {
    /// Maximum width of the path column.
    #[arg(
        long,
        global = true,
        env = "NEOTAGS_MAX_PATH_WIDTH",
        default_value_t = DEFAULT_MAX_PATH_WIDTH,
        value_name = "COLUMNS",
        long_help = "Maximum width of the path column, in display columns.\n\n\
Longer paths are cut from the left and prefixed with '<', so the file name\n\
always stays visible."
    )]
    pub max_path_width: usize,

    /// Maximum width of the code column.
    #[arg(
        long,
        global = true,
        env = "NEOTAGS_MAX_CODE_WIDTH",
        default_value_t = DEFAULT_MAX_CODE_WIDTH,
        value_name = "COLUMNS",
        long_help = "Maximum width of the code column, in display columns.\n\n\
The code column is only padded (and cut with '…') when a comment follows it."
    )]
    pub max_code_width: usize,

    /// Field delimiter (tab/nul).
    #[arg(
        long,
        global = true,
        env = "NEOTAGS_DELIMITER",
        default_value = "tab",
        value_parser = ["tab", "nul"],
        value_name = "DELIM",
        long_help = "Separator between path, address and display fields.\n\n\
Use nul when pattern addresses may contain tabs."
    )]
    pub delimiter: String,

    /// Output format (picker/jsonl).
    #[arg(
        long,
        global = true,
        default_value = "picker",
        value_parser = ["picker", "jsonl"],
        value_name = "FORMAT",
        long_help = "Select the output format.\n\n\
Supported values:\n\
- picker (default): path<D>address<D>display lines\n\
- jsonl: one JSON object per resolved tag"
    )]
    pub format: String,

    /// Disable colored output.
    #[arg(
        long,
        global = true,
        long_help = "Disable ANSI colors in the display field. Setting NO_COLOR has the\n\
same effect."
    )]
    pub no_color: bool,

    /// Quiet mode (errors only).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find tags with an exact name in a ctags tag file.
    #[command(
        long_about = "Look up every tag named exactly NAME in TAGFILE and print one line per\n\
match, in tag file order.\n\n\
Paths in the tag file are taken relative to the tag file's directory\n\
(ctags --tag-relative=yes) and shown relative to the current directory.\n\
Line-number addresses are resolved by reading each source file once.\n\n\
Examples:\n\
  neotags search main tags\n\
  neotags --delimiter nul search Parser ../tags\n"
    )]
    Search {
        /// Tag name to match exactly.
        #[arg(value_name = "NAME")]
        name: String,

        /// Path to the tag file.
        #[arg(value_name = "TAGFILE", default_value = "tags")]
        tag_file: PathBuf,
    },

    /// List every tag in one source file (runs ctags).
    #[command(
        long_about = "Run `ctags -f - --excmd=number FILE` and print every tag in generator\n\
order, aligned by tag name.\n\n\
Example:\n\
  neotags list src/main.c\n"
    )]
    List {
        /// Source file to list tags from.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Search a gtags database with global/pglobal.
    #[command(
        long_about = "Run `global --result=grep ARGS` against DBPATH (or `pglobal -n N` when\n\
-n is greater than zero) and print one line per result.\n\n\
Examples:\n\
  neotags gtags .gtags -- -d main\n\
  neotags gtags -n 8 /path/to/db -- -r main\n"
    )]
    Gtags {
        /// Number of parallel instances (0 uses plain global).
        #[arg(short = 'n', long = "jobs", default_value_t = 0, value_name = "N")]
        jobs: usize,

        /// Directory holding the gtags database.
        #[arg(value_name = "DBPATH")]
        dbpath: PathBuf,

        /// Arguments passed to global.
        #[arg(value_name = "GLOBAL_ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Render raw tag lines read from stdin.
    #[command(
        long_about = "Read raw tag lines from stdin and run them through the same resolve and\n\
render pipeline.\n\n\
Layouts:\n\
- search (default): ctags lines, aligned by path, code resolved\n\
- listing: ctags lines, aligned by tag name\n\
- location: global --result=grep lines (file:line:text)\n\n\
Example:\n\
  readtags -t tags main | neotags render\n"
    )]
    Render {
        /// Display layout (search/listing/location).
        #[arg(
            long,
            default_value = "search",
            value_parser = ["search", "listing", "location"],
            value_name = "LAYOUT"
        )]
        layout: String,

        /// Directory the input paths are relative to (defaults to the current directory).
        #[arg(long, value_name = "DIR")]
        base_dir: Option<PathBuf>,
    },

    /// Forward a picked line to a running editor for preview.
    #[command(
        long_about = "Split CONTEXT (a line printed by this tool) into path, address and\n\
display, and call neoview#run(PREVIEW_FN, context) in the editor listening at\n\
--server (defaults to $NVIM_LISTEN_ADDRESS).\n\n\
Without CONTEXT (or with `-`) the line is read from stdin. NUL-delimited\n\
lines (--delimiter nul) must be passed this way, since arguments cannot\n\
hold NUL.\n\n\
Example:\n\
  fzf --preview 'neotags preview neoview#tags#preview {}'\n"
    )]
    Preview {
        /// Editor function that renders the preview.
        #[arg(value_name = "PREVIEW_FN")]
        preview_fn: String,

        /// The picked line; omit or pass `-` to read it from stdin.
        #[arg(value_name = "CONTEXT")]
        context: Option<String>,

        /// Editor server address.
        #[arg(long, env = "NVIM_LISTEN_ADDRESS", value_name = "ADDR")]
        server: Option<String>,

        /// Print the editor expression instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Check external dependencies.
    #[command(
        long_about = "Check whether the external tools used by list/gtags/preview are\n\
installed and discoverable (ctags, global, pglobal, nvim).\n\n\
Example:\n\
  neotags doctor\n"
    )]
    Doctor,
}

impl Cli {
    /// Log filter derived from -q/-v
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    fn render_config(&self) -> RenderConfig {
        let format: OutputFormat = self.format.parse().unwrap_or_default();
        let delimiter: Delimiter = self.delimiter.parse().unwrap_or_default();
        let color = !self.no_color && std::env::var_os("NO_COLOR").is_none();
        RenderConfig::new(format, delimiter, color)
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    let render = cli.render_config();

    // Pickers read through a pipe; decide color here rather than by tty detection
    colored::control::set_override(render.color);

    let config = PipelineConfig {
        render,
        max_path_width: cli.max_path_width,
        max_code_width: cli.max_code_width,
        cwd: std::env::current_dir().context("Failed to determine current directory")?,
    };

    match cli.command {
        Commands::Search { name, tag_file } => {
            crate::backends::ctags::run_search(&name, &tag_file, &config)
        }

        Commands::List { file } => crate::backends::ctags::run_list(&file, &config),

        Commands::Gtags { jobs, dbpath, args } => {
            let query = GtagsQuery::new(dbpath, jobs, args);
            crate::backends::gtags::run_gtags(&query, &config)
        }

        Commands::Render { layout, base_dir } => {
            let layout: Layout = layout.parse().unwrap_or_default();
            crate::backends::stdin::run_render(layout, base_dir.as_deref(), &config)
        }

        Commands::Preview {
            preview_fn,
            context,
            server,
            dry_run,
        } => crate::backends::preview::run_preview(
            &preview_fn,
            context.as_deref(),
            server.as_deref(),
            render.delimiter,
            dry_run,
        ),

        Commands::Doctor => crate::backends::doctor::run_doctor(render.color),
    }
}
