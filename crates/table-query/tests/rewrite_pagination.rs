//! Tests for LIMIT/OFFSET rewrites.

mod common;
use common::*;

use table_query::ast::Pagination;
use table_query::constants::UNBOUNDED_LIMIT;
use table_query::rewrite::{convert_to_paginated_query, limit_max_rows_per_page, override_pagination};
use table_query::{Parser, QueryError};

struct Case {
    sql: &'static str,
    offset: Option<u64>,
    limit: Option<u64>,
    max: Option<u64>,
    expected: &'static str,
}

const CASES: &[Case] = &[
    Case {
        sql: "select * from syn123",
        offset: None,
        limit: None,
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 1000 OFFSET 0",
    },
    Case {
        sql: "select * from syn123",
        offset: Some(12),
        limit: None,
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 1000 OFFSET 12",
    },
    Case {
        sql: "select * from syn123",
        offset: None,
        limit: Some(15),
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 15 OFFSET 0",
    },
    Case {
        sql: "select * from syn123 limit 34",
        offset: None,
        limit: None,
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 34 OFFSET 0",
    },
    Case {
        sql: "select * from syn123 limit 34 offset 12",
        offset: None,
        limit: None,
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 34 OFFSET 12",
    },
    Case {
        sql: "select * from syn123 limit 34 offset 12",
        offset: Some(2),
        limit: None,
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 32 OFFSET 14",
    },
    Case {
        sql: "select * from syn123 limit 34 offset 12",
        offset: None,
        limit: Some(3),
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 3 OFFSET 12",
    },
    Case {
        sql: "select * from syn123 limit 100 offset 50",
        offset: Some(10),
        limit: Some(25),
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 25 OFFSET 60",
    },
    Case {
        sql: "select * from syn123 limit 100 offset 50",
        offset: Some(101),
        limit: Some(25),
        max: Some(1000),
        expected: "SELECT * FROM syn123 LIMIT 0 OFFSET 151",
    },
    Case {
        sql: "select * from syn123 limit 100",
        offset: None,
        limit: None,
        max: Some(99),
        expected: "SELECT * FROM syn123 LIMIT 99 OFFSET 0",
    },
    Case {
        sql: "select * from syn123 limit 100 offset 75",
        offset: Some(10),
        limit: Some(50),
        max: None,
        expected: "SELECT * FROM syn123 LIMIT 50 OFFSET 85",
    },
    Case {
        sql: "select * from syn123 limit 100 offset 75",
        offset: None,
        limit: None,
        max: None,
        expected: "SELECT * FROM syn123 LIMIT 100 OFFSET 75",
    },
];

#[test]
fn override_pagination_scenarios() {
    for case in CASES {
        let query = parse(case.sql);
        let page = override_pagination(&query, case.offset, case.limit, case.max).unwrap();
        assert_eq!(
            page.to_sql(),
            case.expected,
            "{} with offset {:?}, limit {:?}, max {:?}",
            case.sql,
            case.offset,
            case.limit,
            case.max
        );
    }
}

#[test]
fn unbounded_request_without_cap() {
    let query = parse("select * from syn123 where a = 1");
    let page = override_pagination(&query, Some(5), None, None).unwrap();
    assert_eq!(
        page.to_sql(),
        "SELECT * FROM syn123 WHERE a = 1 LIMIT 9223372036854775807 OFFSET 5"
    );
    assert_eq!(UNBOUNDED_LIMIT, 9_223_372_036_854_775_807);
    // the unbounded limit still parses
    round_trip(&page.to_sql());
}

#[test]
fn offsets_saturate() {
    let query = parse(&format!("select * from syn123 limit 10 offset {}", u64::MAX - 1));
    let page = override_pagination(&query, Some(5), None, Some(100)).unwrap();
    assert_eq!(
        page.to_sql(),
        format!("SELECT * FROM syn123 LIMIT 5 OFFSET {}", u64::MAX)
    );
}

#[test]
fn convert_keeps_other_clauses() {
    let query = parse("select a, count(*) from syn123 where b = 1 group by a order by a desc");
    let converted = convert_to_paginated_query(&query, None, Some(10)).unwrap();
    assert_eq!(
        converted.to_sql(),
        "SELECT a, COUNT(*) FROM syn123 WHERE b = 1 GROUP BY a ORDER BY a DESC LIMIT 10"
    );
    let converted = convert_to_paginated_query(&query, Some(20), None).unwrap();
    assert_eq!(
        converted.to_sql(),
        "SELECT a, COUNT(*) FROM syn123 WHERE b = 1 GROUP BY a ORDER BY a DESC OFFSET 20"
    );
}

#[test]
fn result_is_compact() {
    let query = parse("select * from syn123 limit 10 offset 2");
    let converted = convert_to_paginated_query(&query, Some(1), Some(2)).unwrap();
    let tree = converted.tree();
    assert_eq!(tree.len(), tree.descendants(converted.root()).len());
}

#[test]
fn query_specification_root_is_accepted() {
    let query = parse_with("select * from syn123 limit 10", Parser::query_specification);
    let page = override_pagination(&query, Some(2), Some(3), None).unwrap();
    assert_eq!(page.to_sql(), "SELECT * FROM syn123 LIMIT 3 OFFSET 2");
}

#[test]
fn union_is_unsupported() {
    let query = parse("select a from syn1 union select a from syn2");
    assert!(matches!(
        override_pagination(&query, Some(1), Some(1), None),
        Err(QueryError::Unsupported(_))
    ));
    assert!(matches!(
        convert_to_paginated_query(&query, None, Some(1)),
        Err(QueryError::Unsupported(_))
    ));
}

#[test]
fn cap_helper() {
    let page = Pagination {
        limit: Some(500),
        offset: Some(7),
    };
    assert_eq!(
        limit_max_rows_per_page(page, Some(100)),
        Pagination {
            limit: Some(100),
            offset: Some(7),
        }
    );
    assert_eq!(limit_max_rows_per_page(page, None), page);
}
