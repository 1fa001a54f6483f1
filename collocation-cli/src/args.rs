use clap::Args;
use collocation_search::search::SearchFilters;

/// Search filters shared by `explain` and `search`
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Substring of the head word
    #[arg(long, value_name = "TEXT")]
    pub head_text: Option<String>,

    /// Substring of the dependent word
    #[arg(long, value_name = "TEXT")]
    pub dpdt_text: Option<String>,

    /// Accepted head POS tag (repeatable)
    #[arg(long, value_name = "TAG")]
    pub head_pos: Vec<String>,

    /// Accepted dependent POS tag (repeatable)
    #[arg(long, value_name = "TAG")]
    pub dpdt_pos: Vec<String>,

    /// Accepted dependency type (repeatable)
    #[arg(long, value_name = "TYPE")]
    pub dep_type: Vec<String>,

    /// Minimum frequency
    #[arg(long, default_value_t = 1)]
    pub freq_inf: i64,

    /// Maximum frequency
    #[arg(long)]
    pub freq_sup: Option<i64>,

    /// Collocations per page
    #[arg(long, default_value_t = 8)]
    pub results_limit: i64,

    /// Collocations to skip
    #[arg(long, default_value_t = 0)]
    pub results_offset: i64,

    /// Examples per collocation
    #[arg(long, default_value_t = 5)]
    pub examples_limit: i64,

    /// Examples to skip per collocation
    #[arg(long, default_value_t = 0)]
    pub examples_offset: i64,

    /// Only examples from this book (repeatable)
    #[arg(long = "book-name", value_name = "NAME")]
    pub book_names: Vec<String>,

    /// Only examples from books in this category (repeatable)
    #[arg(long = "book-category", value_name = "CATEGORY")]
    pub book_categories: Vec<String>,

    /// Only examples from books of this period (repeatable)
    #[arg(long = "book-period", value_name = "PERIOD")]
    pub book_periods: Vec<String>,

    /// Only examples from books in this style (repeatable)
    #[arg(long = "book-style", value_name = "STYLE")]
    pub book_styles: Vec<String>,
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            head_text: args.head_text,
            head_pos: args.head_pos,
            dpdt_text: args.dpdt_text,
            dpdt_pos: args.dpdt_pos,
            dep_type: args.dep_type,
            freq_inf: args.freq_inf,
            freq_sup: args.freq_sup,
            results_limit: args.results_limit,
            results_offset: args.results_offset,
            examples_limit: args.examples_limit,
            examples_offset: args.examples_offset,
            book_names: args.book_names,
            book_categories: args.book_categories,
            book_periods: args.book_periods,
            book_styles: args.book_styles,
        }
    }
}
