mod common;

use common::task_schema;
use gridspec::{
    columns::resolve_columns,
    config::ColumnConfig,
    schema::Schema,
    sort::{SortDirection, SortDirective, parse_sort, tokenize},
};
use proptest::prelude::*;

fn directive(key: &str, direction: SortDirection) -> SortDirective {
    SortDirective::new(key, direction)
}

#[test]
fn quoted_tokens_parse_like_unquoted_ones() {
    let schema = task_schema();
    let plain = parse_sort("Title:desc,DueDate:asc", &[], &schema);
    let quoted = parse_sort(r#""Title:desc","DueDate:asc""#, &[], &schema);
    let single = parse_sort("'Title:desc', 'DueDate:asc'", &[], &schema);
    assert_eq!(
        plain,
        vec![
            directive("Title", SortDirection::Desc),
            directive("DueDate", SortDirection::Asc)
        ]
    );
    assert_eq!(quoted, plain);
    assert_eq!(single, plain);
}

#[test]
fn bare_field_defaults_to_ascending() {
    let parsed = parse_sort("Title", &[], &task_schema());
    assert_eq!(parsed, vec![directive("Title", SortDirection::Asc)]);
}

#[test]
fn titles_and_casing_resolve_to_schema_keys() {
    let parsed = parse_sort(r#""Due Date":d, entityguid:-, done:sideways"#, &[], &task_schema());
    assert_eq!(
        parsed,
        vec![
            directive("DueDate", SortDirection::Desc),
            directive("EntityGuid", SortDirection::Desc),
            directive("Done", SortDirection::Asc),
        ]
    );
}

#[test]
fn configured_column_titles_win_over_schema_titles() {
    let schema = task_schema();
    let columns = resolve_columns(&[ColumnConfig::new("Id").titled("Title")], false, &schema);
    let parsed = parse_sort("title:desc", &columns, &schema);
    // Column titles are consulted before any schema key.
    assert_eq!(parsed, vec![directive("Id", SortDirection::Desc)]);
}

#[test]
fn quoted_commas_stay_inside_field_names() {
    let parsed = parse_sort(r#""Last, First":desc,Title"#, &[], &Schema::default());
    assert_eq!(
        parsed,
        vec![
            directive("Last, First", SortDirection::Desc),
            directive("Title", SortDirection::Asc)
        ]
    );
}

#[test]
fn colon_only_expression_is_split_into_pairs() {
    let parsed = parse_sort("Title:desc:Id:asc", &[], &task_schema());
    assert_eq!(
        parsed,
        vec![
            directive("Title", SortDirection::Desc),
            directive("Id", SortDirection::Asc)
        ]
    );
}

#[test]
fn malformed_expressions_degrade() {
    let schema = task_schema();
    assert!(parse_sort("", &[], &schema).is_empty());
    assert!(parse_sort(" , ,, ", &[], &schema).is_empty());
    assert!(parse_sort(":desc", &[], &schema).is_empty());
    assert_eq!(
        parse_sort(r#""Title:desc"#, &[], &schema),
        vec![directive("Title", SortDirection::Desc)]
    );
    assert_eq!(tokenize(r#"a"b,c"#), vec![r#"a"b"#, "c"]);
}

#[test]
fn fully_quoted_expression_keeps_every_directive() {
    let parsed = parse_sort(r#""Title:desc,DueDate:asc""#, &[], &task_schema());
    assert_eq!(
        parsed,
        vec![
            directive("Title", SortDirection::Desc),
            directive("DueDate", SortDirection::Asc),
        ]
    );
}

#[test]
fn loose_direction_words_and_apostrophes() {
    let parsed = parse_sort("O'Brien:dsc,It's:down,Title:up", &[], &Schema::default());
    assert_eq!(
        parsed,
        vec![
            directive("O'Brien", SortDirection::Desc),
            directive("It's", SortDirection::Desc),
            directive("Title", SortDirection::Asc),
        ]
    );
}

#[test]
fn authored_priority_is_preserved() {
    let parsed = parse_sort("Id,Title,DueDate", &[], &task_schema());
    let keys: Vec<&str> = parsed.iter().map(|d| d.field_key.as_str()).collect();
    assert_eq!(keys, vec!["Id", "Title", "DueDate"]);
}

proptest! {
    #[test]
    fn parser_is_total(expression in r#"[A-Za-z :,"'\-]{0,40}"#) {
        let schema = task_schema();
        let parsed = parse_sort(&expression, &[], &schema);
        for directive in &parsed {
            prop_assert!(!directive.field_key.is_empty());
        }
        prop_assert!(parsed.len() <= expression.len());
    }

    #[test]
    fn rendered_directives_parse_back(
        fields in proptest::collection::vec(("[A-Za-z][A-Za-z0-9]{0,8}", any::<bool>()), 1..5)
    ) {
        let expression = fields
            .iter()
            .map(|(name, desc)| format!("{name}:{}", if *desc { "desc" } else { "asc" }))
            .collect::<Vec<_>>()
            .join(",");
        let parsed = parse_sort(&expression, &[], &Schema::default());
        let expected = fields
            .iter()
            .map(|(name, desc)| directive(name, if *desc { SortDirection::Desc } else { SortDirection::Asc }))
            .collect::<Vec<_>>();
        prop_assert_eq!(parsed, expected);
    }
}
