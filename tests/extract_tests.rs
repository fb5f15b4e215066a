use std::path::Path;

use sql_lint_gateway::extract::{Language, Snippet, SourceKind, extract};

const JAVA: SourceKind = SourceKind::Code(Language::Java);
const PYTHON: SourceKind = SourceKind::Code(Language::Python);

fn sqls(snippets: &[Snippet]) -> Vec<&str> {
    snippets.iter().map(|s| s.sql.as_str()).collect()
}

mod fixtures {
    use super::*;

    #[test]
    fn test_concatenated_user_input() {
        let snippets = extract(include_str!("fixtures/fail_java.java"), JAVA);
        assert_eq!(
            snippets,
            vec![Snippet {
                line:    20,
                sql:     "SELECT * FROM users WHERE name = '?'".to_string(),
                dynamic: true
            }]
        );
    }

    #[test]
    fn test_query_annotation() {
        let snippets = extract(include_str!("fixtures/Badjava.java"), JAVA);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].line, 8);
        assert_eq!(snippets[0].sql, "SELECT * FROM users WHERE active = 1");
        assert!(!snippets[0].dynamic);
    }

    #[test]
    fn test_repository_annotations() {
        let snippets = extract(include_str!("fixtures/goodjava.java"), JAVA);
        assert_eq!(
            sqls(&snippets),
            vec![
                "SELECT customer_id, name, email FROM customers WHERE customer_id = :id",
                "SELECT * FROM customers WHERE status = 'ACTIVE'",
                "SELECT username, password FROM users WHERE id = :id",
                "select customer_id, name from customers where created_at > now()",
            ]
        );
        let lines: Vec<_> = snippets.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![10, 13, 16, 19]);
        assert!(snippets.iter().all(|s| !s.dynamic));
    }

    #[test]
    fn test_mixed_jdbc_and_jpql() {
        let snippets = extract(include_str!("fixtures/goodjavatest.java"), JAVA);
        let lines: Vec<_> = snippets.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![31, 52, 65, 83, 109]);

        assert_eq!(
            snippets[2].sql,
            "SELECT t.txId, t.amount, t.merchantName FROM Transaction t WHERE t.amount >= \
             :minAmount AND t.txType = :type ORDER BY t.txDate DESC"
        );
        assert!(!snippets[2].dynamic);
        assert_eq!(
            snippets[3].sql,
            "INSERT INTO transactions (tx_id, account_id, tx_type, amount, merchant_name, \
             tx_date) VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP)"
        );

        let sorted = &snippets[4];
        assert_eq!(
            sorted.sql,
            "SELECT * FROM accounts WHERE customer_id = ? ORDER BY ? DESC"
        );
        assert!(sorted.dynamic);
    }

    #[test]
    fn test_several_statements() {
        let snippets = extract(include_str!("fixtures/many_query_test.java"), JAVA);
        let lines: Vec<_> = snippets.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![18, 39, 57]);
        assert!(snippets[1].sql.starts_with("UPDATE customers"));
        assert_eq!(
            snippets[2].sql,
            "SELECT tx_id, merchant_name, amount, tx_date FROM transactions WHERE account_id = \
             ? AND amount >= ? ORDER BY tx_date DESC"
        );
    }

    #[test]
    fn test_text_blocks() {
        for (source, last) in [
            (include_str!("fixtures/java_test1.java"), "LIMIT 100"),
            (include_str!("fixtures/test_java.java"), "LIMIT 100"),
            (include_str!("fixtures/good_test1.java"), "LIMIT 50"),
        ] {
            let snippets = extract(source, JAVA);
            assert_eq!(snippets.len(), 1);
            assert_eq!(snippets[0].line, 20);
            assert!(snippets[0].sql.starts_with("SELECT\n    t."));
            assert!(snippets[0].sql.ends_with(last));
            assert!(!snippets[0].dynamic);
        }
    }

    #[test]
    fn test_text_block_ignores_comments_and_plain_strings() {
        let snippets = extract(include_str!("fixtures/test_masking1.java"), JAVA);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].line, 24);
        assert!(snippets[0].sql.starts_with("SELECT\n    user_id,"));
        assert!(snippets[0].sql.ends_with("LIMIT 1"));
        assert!(!snippets[0].sql.contains("990101"));
    }

    #[test]
    fn test_python_module() {
        let snippets = extract(include_str!("fixtures/app_example.py"), PYTHON);
        assert_eq!(snippets.len(), 2);

        assert_eq!(snippets[0].line, 6);
        assert!(snippets[0].sql.starts_with("SELECT\n    customer_id,"));
        assert!(snippets[0].sql.ends_with("status = 'ACTIVE';"));

        assert_eq!(snippets[1].line, 20);
        assert_eq!(
            snippets[1].sql,
            "DELETE FROM customers WHERE rrn = '990101-1234567';"
        );
    }
}

mod java {
    use super::*;

    #[test]
    fn test_ignores_non_sql_strings() {
        let source = r#"
            String greeting = "Hello " + name;
            log.info("Selected rows: " + count);
        "#;
        assert!(extract(source, JAVA).is_empty());
    }

    #[test]
    fn test_ignores_comments() {
        let source = r#"
            // String sql = "DELETE FROM users";
            /* "DROP TABLE users" */
            String ok = "SELECT 1 FROM dual";
        "#;
        assert_eq!(sqls(&extract(source, JAVA)), vec!["SELECT 1 FROM dual"]);
    }

    #[test]
    fn test_escaped_quotes() {
        let source = r#"String sql = "SELECT \"id\" FROM t";"#;
        assert_eq!(sqls(&extract(source, JAVA)), vec![r#"SELECT "id" FROM t"#]);
    }

    #[test]
    fn test_method_call_operand() {
        let source = r#"String sql = "SELECT * FROM t WHERE id = " + req.getParam("id").trim() + " LIMIT 1";"#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets[0].sql, "SELECT * FROM t WHERE id = ? LIMIT 1");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_formatted_is_dynamic() {
        let source = r#"String sql = "SELECT name FROM t WHERE id = %s".formatted(id);"#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_string_format_is_dynamic() {
        let source = r#"String sql = String.format("DELETE FROM %s", table);"#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets[0].sql, "DELETE FROM %s");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_char_literal_does_not_open_string() {
        let source = r#"char q = '"'; String sql = "UPDATE t SET a = 1";"#;
        assert_eq!(sqls(&extract(source, JAVA)), vec!["UPDATE t SET a = 1"]);
    }

    #[test]
    fn test_plus_assign_extends_snippet() {
        let source = r#"
            String sql = "SELECT id FROM users WHERE 1 = 1";
            sql += " AND name = '" + name + "'";
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(
            snippets,
            vec![Snippet {
                line:    2,
                sql:     "SELECT id FROM users WHERE 1 = 1 AND name = '?'".to_string(),
                dynamic: true
            }]
        );
    }

    #[test]
    fn test_plus_assign_of_literals_stays_static() {
        let source = r#"
            String sql = "SELECT id FROM users";
            if (activeOnly) {
                sql += " WHERE active = 1";
            }
            run(sql);
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].sql, "SELECT id FROM users WHERE active = 1");
        assert!(!snippets[0].dynamic);
    }

    #[test]
    fn test_string_builder_append() {
        let source = r#"
            StringBuilder sb = new StringBuilder("SELECT id FROM users WHERE name = '");
            sb.append(name).append("'");
            stmt.executeQuery(sb.toString());
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].sql, "SELECT id FROM users WHERE name = '?'");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_append_chain_on_receiver() {
        let source = r#"
            StringBuilder sb = new StringBuilder();
            sb.append("DELETE FROM sessions WHERE user_id = ").append(userId);
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets[0].sql, "DELETE FROM sessions WHERE user_id = ?");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_appends_stop_at_reassignment() {
        let source = r#"
            String sql = "SELECT id FROM a";
            sql = "SELECT id FROM b";
            sql += " WHERE x = " + x;
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].sql, "SELECT id FROM a");
        assert!(!snippets[0].dynamic);
        assert_eq!(snippets[1].sql, "SELECT id FROM b WHERE x = ?");
        assert!(snippets[1].dynamic);
    }

    #[test]
    fn test_appends_stop_at_end_of_block() {
        let source = r#"
            void a() {
                String sql = "SELECT id FROM a";
                run(sql);
            }
            void b() {
                sql += " WHERE x = " + x;
            }
        "#;
        let snippets = extract(source, JAVA);
        assert_eq!(snippets[0].sql, "SELECT id FROM a");
        assert!(!snippets[0].dynamic);
    }

    #[test]
    fn test_line_numbers_counted_across_literals() {
        let source = "int a;\n\nString s = \"SELECT 1 FROM t\";\n";
        assert_eq!(extract(source, JAVA)[0].line, 3);
    }
}

mod python {
    use super::*;

    #[test]
    fn test_f_string_fields() {
        let source = r#"q = f"SELECT name FROM users WHERE id = {user_id}""#;
        let snippets = extract(source, PYTHON);
        assert_eq!(snippets[0].sql, "SELECT name FROM users WHERE id = ?");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_f_string_without_fields_is_static() {
        let source = r#"q = f"SELECT {{}} FROM t""#;
        let snippets = extract(source, PYTHON);
        assert_eq!(snippets[0].sql, "SELECT {} FROM t");
        assert!(!snippets[0].dynamic);
    }

    #[test]
    fn test_percent_formatting_is_dynamic() {
        let source = r#"cur.execute("SELECT * FROM t WHERE id = '%s'" % user_id)"#;
        assert!(extract(source, PYTHON)[0].dynamic);
    }

    #[test]
    fn test_format_method_is_dynamic() {
        let source = r#"q = "DELETE FROM {}".format(table)"#;
        assert!(extract(source, PYTHON)[0].dynamic);
    }

    #[test]
    fn test_bind_parameters_are_static() {
        let source = r#"cur.execute("SELECT name FROM t WHERE id = %s", (user_id,))"#;
        let snippets = extract(source, PYTHON);
        assert_eq!(snippets.len(), 1);
        assert!(!snippets[0].dynamic);
    }

    #[test]
    fn test_adjacent_literals_join() {
        let source = "q = (\"SELECT id \"\n     \"FROM t\")\n";
        let snippets = extract(source, PYTHON);
        assert_eq!(snippets[0].sql, "SELECT id FROM t");
        assert_eq!(snippets[0].line, 1);
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        let source = r#"q = r"SELECT '\d+' FROM t""#;
        assert_eq!(extract(source, PYTHON)[0].sql, r"SELECT '\d+' FROM t");
    }

    #[test]
    fn test_plus_assign_f_string() {
        let source = "q = \"SELECT id FROM t WHERE 1 = 1\"\nq += f\" AND owner = '{owner}'\"\n";
        let snippets = extract(source, PYTHON);
        assert_eq!(snippets[0].sql, "SELECT id FROM t WHERE 1 = 1 AND owner = '?'");
        assert!(snippets[0].dynamic);
    }

    #[test]
    fn test_hash_comment_ignored() {
        let source = "# q = \"DROP TABLE t\"\nx = 1\n";
        assert!(extract(source, PYTHON).is_empty());
    }

    #[test]
    fn test_single_quoted() {
        let source = "q = 'TRUNCATE TABLE audit_log'\n";
        assert_eq!(
            sqls(&extract(source, PYTHON)),
            vec!["TRUNCATE TABLE audit_log"]
        );
    }
}

mod sql_files {
    use super::*;

    #[test]
    fn test_whole_file_is_one_snippet() {
        let source = "-- nightly cleanup\nDELETE FROM sessions;\n";
        assert_eq!(
            extract(source, SourceKind::Sql),
            vec![Snippet {
                line:    1,
                sql:     source.to_string(),
                dynamic: false
            }]
        );
    }

    #[test]
    fn test_blank_file_has_no_snippets() {
        assert!(extract("  \n\t\n", SourceKind::Sql).is_empty());
    }
}

#[test]
fn test_source_kind_from_path() {
    assert_eq!(SourceKind::from_path(Path::new("Dao.java")), Some(JAVA));
    assert_eq!(SourceKind::from_path(Path::new("app.PY")), Some(PYTHON));
    assert_eq!(
        SourceKind::from_path(Path::new("q.sql")),
        Some(SourceKind::Sql)
    );
    assert_eq!(SourceKind::from_path(Path::new("notes.txt")), None);
    assert_eq!(SourceKind::from_path(Path::new("Makefile")), None);
}
