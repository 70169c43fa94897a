use std::sync::Arc;

use tableq_core::{Converter, Parser, ParserOptions, ResultSet, TableError, TableParams};
use tableq_test::{people, person_schema, JsonAssert, Person, TableRequest};

fn parse(params: &TableParams) -> ResultSet<Person> {
    Parser::new(params, person_schema(), people())
        .unwrap()
        .parse()
        .unwrap()
}

fn first_names(result: &ResultSet<Person>) -> Vec<&str> {
    result.page.iter().map(|p| p.first_name.as_str()).collect()
}

#[test]
fn test_total_records() {
    let result = parse(&TableRequest::people().build());
    assert_eq!(result.total_count, 6);
    assert_eq!(result.filtered_count, 6);
    assert_eq!(result.draw, 1);
}

#[test]
fn test_page_length() {
    let result = parse(&TableRequest::people().length(3).build());
    assert_eq!(result.page.len(), 3);
    assert_eq!(first_names(&result), vec!["Bandy", "Cromie", "James"]);
}

#[test]
fn test_global_search() {
    let result = parse(&TableRequest::people().search("Cromie").build());
    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.total_count, 6);
}

#[test]
fn test_global_and_column_search() {
    let params = TableRequest::people().search("a").column_search(1, "mmer").build();
    let result = parse(&params);
    assert_eq!(result.filtered_count, 1);
    assert_eq!(result.page[0].last_name, "Crammer");
}

#[test]
fn test_multiple_column_searches() {
    let params = TableRequest::people()
        .search("a")
        .column_search(0, "omie")
        .column_search(1, "mmer")
        .build();
    assert_eq!(parse(&params).filtered_count, 1);
}

#[test]
fn test_starts_with_token() {
    let result = parse(&TableRequest::people().search("*|Cr").build());
    assert_eq!(result.filtered_count, 1);
    assert_eq!(first_names(&result), vec!["Cromie"]);
}

#[test]
fn test_ends_with_token() {
    let result = parse(&TableRequest::people().search("ie|*").build());
    assert_eq!(result.filtered_count, 4);
    assert_eq!(first_names(&result), vec!["Cromie", "James", "Tannie", "Xorie"]);
}

#[test]
fn test_search_is_case_insensitive() {
    let result = parse(&TableRequest::people().search("cROMIE").build());
    assert_eq!(result.filtered_count, 1);
}

#[test]
fn test_numeric_and_date_columns_are_searchable() {
    let result = parse(&TableRequest::people().search("1953-09").build());
    assert_eq!(first_names(&result), vec!["Cromie"]);

    let result = parse(&TableRequest::people().column_search(5, "15").build());
    assert_eq!(first_names(&result), vec!["Cromie"]);
}

#[test]
fn test_absent_values_never_match() {
    // Only three people carry a red blood cell count.
    let result = parse(&TableRequest::people().column_search(6, "00").build());
    assert_eq!(result.filtered_count, 3);
}

#[test]
fn test_unmapped_column_filter_is_ignored() {
    // Column 4 asks for "Height"; the property is "height".
    let result = parse(&TableRequest::people().column_search(4, "5.4").build());
    assert_eq!(result.filtered_count, 6);
}

#[test]
fn test_descending_sort_with_tie_break() {
    let params = TableRequest::people()
        .order(0, 3, "desc")
        .order(1, 1, "asc")
        .build();
    let result = parse(&params);
    assert_eq!(
        first_names(&result),
        vec!["Tannie", "James", "Bandy", "Xorie", "Tony", "Cromie"]
    );
}

#[test]
fn test_non_orderable_sort_falls_back() {
    let params = TableRequest::people()
        .param("columns[5][orderable]", "false")
        .order(0, 5, "desc")
        .build();
    assert_eq!(first_names(&parse(&params))[0], "Bandy");
}

#[test]
fn test_nulls_sort_first() {
    let params = TableRequest::people().order(0, 6, "asc").order(1, 0, "asc").build();
    assert_eq!(
        first_names(&parse(&params)),
        vec!["Tannie", "Tony", "Xorie", "Cromie", "James", "Bandy"]
    );
}

#[test]
fn test_page_size_invariant() {
    for (start, length) in [(0, 4), (2, 3), (5, 10), (7, 2)] {
        let params = TableRequest::people().search("a").start(start).length(length).build();
        let result = parse(&params);
        let expected = (result.filtered_count as i64 - start).clamp(0, length) as usize;
        assert_eq!(result.page.len(), expected, "start={start} length={length}");
    }
}

#[test]
fn test_show_all() {
    let result = parse(&TableRequest::people().length(-1).build());
    assert_eq!(result.page.len(), 6);
}

#[test]
fn test_malformed_scalars_fall_back() {
    let params = TableRequest::people()
        .param("start", "abc")
        .param("length", "many")
        .param("draw", "x")
        .build();
    let result = parse(&params);
    assert_eq!(result.draw, 0);
    assert_eq!(result.page.len(), 6);
}

#[test]
fn test_draw_is_echoed() {
    let result = parse(&TableRequest::people().draw("42").build());
    assert_eq!(result.draw, 42);
}

#[test]
fn test_missing_draw_fails() {
    let params = TableRequest::people().without("draw").build();
    let parser = Parser::new(&params, person_schema(), people()).unwrap();
    assert!(matches!(parser.parse(), Err(TableError::MissingDrawToken)));
}

#[test]
fn test_no_mappable_columns_fails() {
    let params = TableRequest::new().draw("1").column(0, "Height", true, true).build();
    let err = Parser::new(&params, person_schema(), people()).unwrap_err();
    assert!(matches!(err, TableError::NoMappableColumns));
}

#[test]
fn test_read_only_property_never_filters() {
    let params = TableRequest::new()
        .draw("1")
        .column(0, "FullName", true, true)
        .search("Cromie")
        .build();
    let result = parse(&params);
    assert_eq!(result.total_count, 6);
    assert_eq!(result.filtered_count, 0);
}

#[test]
fn test_converter_replaces_rendering() {
    let params = TableRequest::people().search("*|09/").build();
    let parser = Parser::new(&params, person_schema(), people())
        .unwrap()
        .with_converter(
            "BirthDate",
            Converter::new(|p: &Person| p.birth_date.format("%m/%d/%Y").to_string()),
        );
    let result = parser.parse().unwrap();
    assert_eq!(first_names(&result), vec!["Cromie"]);
}

#[test]
fn test_custom_tokens() {
    let params = TableRequest::people().search("^to").build();
    let options = ParserOptions::default().starts_with_token("^").ends_with_token("$");
    let result = Parser::with_options(&params, person_schema(), people(), options)
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(first_names(&result), vec!["Tony"]);
}

#[test]
fn test_shared_source() {
    let shared: Arc<[Person]> = people().into();
    let params = TableRequest::people().search("ie|*").build();
    let a = Parser::new(&params, person_schema(), Arc::clone(&shared)).unwrap().parse().unwrap();
    let b = Parser::new(&params, person_schema(), &*shared).unwrap().parse().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_result_json_shape() {
    let result = parse(&TableRequest::people().search("*|Cr").build());
    JsonAssert::new(&result)
        .assert_path("draw", 1)
        .assert_path("recordsTotal", 6)
        .assert_path("recordsFiltered", 1)
        .assert_path("data.len()", 1)
        .assert_path("data[0].first_name", "Cromie")
        .assert_path("data[0].birth_date", "1953-09-03");
}

#[tokio::test]
async fn test_parse_async() {
    let params = TableRequest::people().search("Cromie").build();
    let parser = Parser::new(&params, person_schema(), people()).unwrap();
    let result = parser.parse_async().await.unwrap();
    assert_eq!(result.filtered_count, 1);
}

#[test]
fn test_from_query_string() {
    let query = TableRequest::people().search("*|Cr").query_string();
    let result = parse(&TableParams::from_query_str(&query));
    assert_eq!(result.filtered_count, 1);
}

#[test]
fn test_token_only_search_is_no_filter() {
    let result = parse(&TableRequest::people().search("*|*").build());
    assert_eq!(result.filtered_count, 6);
}
