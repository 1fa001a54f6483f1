use anyhow::Result;
use collocation_search::{
    config::Config,
    search::{QueryBuilder, SearchFilters, SqlArg},
};
use colored::Colorize;

use crate::args::FilterArgs;

/// Validate the filters and print the SQL the service would run
pub fn execute(config: &Config, filters: FilterArgs, json: bool) -> Result<()> {
    let filters: SearchFilters = filters.into();
    filters.validate(&config.search)?;

    let builder = QueryBuilder::new(&config.search);
    let plan = builder.page_plan(&filters);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("{}", "Query".bold());
    println!("{}", plan.sql());
    println!();

    println!("{}", "Arguments".bold());
    for (i, arg) in plan.args().iter().enumerate() {
        println!("  {} = {}", format!("${}", i + 1).cyan(), describe(arg));
    }

    if filters.results_offset > 0 {
        println!();
        println!(
            "{}",
            "Count query (used when the page is empty)".bold()
        );
        println!("{}", builder.count_plan(&filters).sql());
    }

    Ok(())
}

fn describe(arg: &SqlArg) -> String {
    match arg {
        SqlArg::Text(text) => format!("{:?}", text),
        SqlArg::TextArray(values) => format!("{:?}", values),
        SqlArg::Int(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&SqlArg::Text("%run%".into())), "\"%run%\"");
        assert_eq!(
            describe(&SqlArg::TextArray(vec!["NOUN".into(), "VERB".into()])),
            "[\"NOUN\", \"VERB\"]"
        );
        assert_eq!(describe(&SqlArg::Int(8)), "8");
    }
}
