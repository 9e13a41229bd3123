use clap::Subcommand;

/// A console command. Every command runs against the selected table.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Create the table.
    Create {
        /// Fields to add after the primary key, e.g. "house, words".
        #[arg(long)]
        fields: Option<String>,
    },
    /// Select rows.
    Select {
        /// Fields to return, e.g. "house, words". Defaults to every field.
        #[arg(long)]
        fields: Option<String>,
        /// A single condition such as "id >= 3".
        #[arg(long = "where", value_name = "CONDITION")]
        condition: Option<String>,
        /// Order keys, e.g. "house asc, words desc".
        #[arg(long)]
        order_by: Option<String>,
        /// Maximum number of rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Rows to skip before the limit applies.
        #[arg(long, requires = "limit")]
        offset: Option<usize>,
        /// Reverse the ordered rows before the limit applies.
        #[arg(long)]
        reverse: bool,
    },
    /// Insert a row, e.g. `insert house=Stark "words=Winter Is Coming"`.
    Insert {
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Set values on every row of the table.
    Update {
        #[arg(required = true, value_name = "FIELD=VALUE")]
        assignments: Vec<String>,
    },
    /// Delete all rows. A backup is taken unless --hard is given.
    Delete {
        #[arg(long)]
        hard: bool,
    },
    /// Remove the table. It is moved to the backup area unless --hard is given.
    Remove {
        #[arg(long)]
        hard: bool,
    },
    /// Add fields to the schema.
    AddFields {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Remove fields and their data.
    RemoveFields {
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Rename fields, e.g. `rename-fields house=family words=motto`.
    RenameFields {
        #[arg(required = true, value_name = "OLD=NEW")]
        mapping: Vec<String>,
    },
    /// Rename the primary key.
    RenamePrimaryKey { name: String },
    /// Find a row by primary key.
    Find {
        id: String,
        /// Fail when no row matches.
        #[arg(long)]
        or_fail: bool,
    },
    /// Show the first row.
    First,
    /// Show the last row.
    Last,
    /// Show the primary key of the last row.
    LastId,
    /// Show the primary key the next insert will assign.
    NextId,
    /// Show the table's schema and row count.
    Describe,
}
