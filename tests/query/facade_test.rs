use insta::assert_snapshot;
use joinstep::metadata::sample::{self, fields};
use joinstep::metadata::{Catalog, DatabaseId, FieldId, TableId};
use joinstep::query::{
    ColumnRef, ConditionOperator, Expression, FacadeError, Join, JoinCondition, JoinFields, Literal,
    Query, QueryFacade, TemporalBucket,
};

/// Departments and employees, where employees reference their manager.
const ORG_CATALOG: &str = r#"
[[databases]]
id = 1
name = "Org"

[[tables]]
id = 1
database = 1
name = "DEPARTMENTS"

[[tables.fields]]
id = 10
name = "ID"
base_type = "integer"
primary_key = true

[[tables]]
id = 2
database = 1
name = "EMPLOYEES"

[[tables.fields]]
id = 20
name = "ID"
base_type = "integer"
primary_key = true

[[tables.fields]]
id = 21
name = "DEPARTMENT_ID"
base_type = "integer"
fk_target = 10

[[tables.fields]]
id = 22
name = "MANAGER_ID"
base_type = "integer"
fk_target = 20
"#;

/// A query reading from the sample Orders table.
fn orders_query() -> Query {
    Query::from_table(sample::SAMPLE_DB_ID, sample::ORDERS_ID)
}

/// Orders joined to Products on the product foreign key.
fn orders_products_join() -> Join {
    Join::new(
        sample::PRODUCTS_ID,
        "Products",
        vec![JoinCondition::equals(
            ColumnRef::new(fields::ORDERS_PRODUCT_ID),
            ColumnRef::joined(fields::PRODUCTS_ID, "Products"),
        )],
    )
}

#[test]
fn test_lhs_columns_of_new_join() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let columns = facade.lhs_columns(&orders_query(), 0, None).unwrap();

    assert_eq!(columns.len(), 9);
    assert!(columns.iter().all(|c| c.join_alias.is_none()));
}

#[test]
fn test_lhs_columns_exclude_own_join() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let query = facade.join(&orders_query(), 0, orders_products_join()).unwrap();

    // Editing the Products join: only Orders columns
    let own = facade.lhs_columns(&query, 0, Some(0)).unwrap();
    assert_eq!(own.len(), 9);

    // A new join after it also sees Products columns
    let next = facade.lhs_columns(&query, 0, None).unwrap();
    assert_eq!(next.len(), 17);
    assert!(next.contains(&ColumnRef::joined(fields::PRODUCTS_CREATED_AT, "Products")));
}

#[test]
fn test_suggested_join_from_lhs_foreign_key() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let join = facade
        .suggested_join(&orders_query(), 0, None, sample::PRODUCTS_ID)
        .unwrap()
        .expect("orders reference products");

    assert_eq!(join, orders_products_join());
    assert_eq!(join.conditions[0].operator, ConditionOperator::Eq);
}

#[test]
fn test_suggested_join_from_target_foreign_key() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let query = Query::from_table(sample::SAMPLE_DB_ID, sample::PRODUCTS_ID);

    let join = facade
        .suggested_join(&query, 0, None, sample::REVIEWS_ID)
        .unwrap()
        .expect("reviews reference products");

    assert_eq!(join.alias, "Reviews");
    assert_eq!(
        join.conditions[0],
        JoinCondition::equals(
            ColumnRef::new(fields::PRODUCTS_ID),
            ColumnRef::joined(fields::REVIEWS_PRODUCT_ID, "Reviews"),
        )
    );
}

#[test]
fn test_no_suggestion_without_foreign_key() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let join = facade
        .suggested_join(&orders_query(), 0, None, sample::REVIEWS_ID)
        .unwrap();

    assert!(join.is_none());
}

#[test]
fn test_alias_names_foreign_key() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let join = facade
        .suggested_join(&orders_query(), 0, None, sample::PEOPLE_ID)
        .unwrap()
        .expect("orders reference people");

    assert_eq!(join.alias, "People - User");
    assert_eq!(
        join.conditions[0].rhs,
        Expression::Column(ColumnRef::joined(fields::PEOPLE_ID, "People - User"))
    );
}

#[test]
fn test_alias_deduplicated_within_stage() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let query = facade.join(&orders_query(), 0, orders_products_join()).unwrap();

    let alias = facade
        .join_alias(&query, 0, None, sample::PRODUCTS_ID, None)
        .unwrap();
    assert_eq!(alias, "Products 2");

    // The join being edited does not collide with itself
    let own = facade
        .join_alias(&query, 0, Some(0), sample::PRODUCTS_ID, None)
        .unwrap();
    assert_eq!(own, "Products");
}

#[test]
fn test_display_info() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let query = orders_query();

    let created_at: Expression = ColumnRef::new(fields::ORDERS_CREATED_AT)
        .with_bucket(Some(TemporalBucket::Month))
        .into();
    let info = facade.display_info(&query, 0, &created_at).unwrap();
    assert_eq!(info.name, "CREATED_AT");
    assert_snapshot!(info.display_name, @"Created At: Month");
    assert!(info.is_temporal);

    let joined: Expression = ColumnRef::joined(fields::PRODUCTS_ID, "Products").into();
    let info = facade.display_info(&query, 0, &joined).unwrap();
    assert_snapshot!(info.long_display_name, @"Products → ID");

    let sum = Expression::call(
        "+",
        vec![
            ColumnRef::new(fields::ORDERS_TOTAL).into(),
            ColumnRef::new(fields::ORDERS_SUBTOTAL).into(),
        ],
    );
    let info = facade.display_info(&query, 0, &sum).unwrap();
    assert_snapshot!(info.display_name, @"Total + Subtotal");

    let text: Expression = Literal::Text("abc".to_string()).into();
    assert_eq!(facade.display_info(&query, 0, &text).unwrap().display_name, "\"abc\"");
    let number: Expression = Literal::Integer(10).into();
    assert_eq!(facade.display_info(&query, 0, &number).unwrap().display_name, "10");
}

#[test]
fn test_display_info_unknown_stage() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let column: Expression = ColumnRef::new(fields::ORDERS_ID).into();

    let result = facade.display_info(&orders_query(), 3, &column);

    assert_eq!(result, Err(FacadeError::StageOutOfRange(3)));
}

#[test]
fn test_default_bucket_respects_base_type() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let created_at = ColumnRef::new(fields::ORDERS_CREATED_AT);
    let total = ColumnRef::new(fields::ORDERS_TOTAL);
    let birth_date = ColumnRef::new(fields::PEOPLE_BIRTH_DATE);

    assert_eq!(
        facade.default_bucket(&created_at, Some(TemporalBucket::Month)),
        Some(TemporalBucket::Month)
    );
    assert_eq!(facade.default_bucket(&total, Some(TemporalBucket::Month)), None);
    // Dates have no time-of-day buckets
    assert_eq!(facade.default_bucket(&birth_date, Some(TemporalBucket::Hour)), None);
}

#[test]
fn test_edits_do_not_touch_input() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let original = orders_products_join();

    let edited = facade.with_fields(&original, JoinFields::None);

    assert_eq!(original.fields, JoinFields::All);
    assert_eq!(edited.fields, JoinFields::None);
    assert_eq!(edited.conditions, original.conditions);
}

#[test]
fn test_with_condition_out_of_range() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let join = orders_products_join();
    let condition = join.conditions[0].clone();

    assert_eq!(
        facade.with_condition(&join, 1, condition),
        Err(FacadeError::ConditionOutOfRange(1))
    );
}

#[test]
fn test_join_requires_condition() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let empty = Join::new(sample::PRODUCTS_ID, "Products", Vec::new());

    assert_eq!(
        facade.join(&orders_query(), 0, empty),
        Err(FacadeError::EmptyConditions)
    );
}

#[test]
fn test_replace_join_renames_later_references() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    // Orders -> Products -> Reviews (on Products.ID)
    let reviews = Join::new(
        sample::REVIEWS_ID,
        "Reviews",
        vec![JoinCondition::equals(
            ColumnRef::joined(fields::PRODUCTS_ID, "Products"),
            ColumnRef::joined(fields::REVIEWS_PRODUCT_ID, "Reviews"),
        )],
    );
    let query = facade.join(&orders_query(), 0, orders_products_join()).unwrap();
    let query = facade.join(&query, 0, reviews).unwrap();

    let renamed = facade.with_alias(&orders_products_join(), "Products - Product");
    let query = facade.replace_join(&query, 0, 0, renamed).unwrap();

    let joins = facade.joins(&query, 0).unwrap();
    assert_eq!(joins[0].alias, "Products - Product");
    assert_eq!(
        joins[1].conditions[0].lhs,
        Expression::Column(ColumnRef::joined(fields::PRODUCTS_ID, "Products - Product"))
    );
}

#[test]
fn test_remove_join_drops_dependents() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let reviews = Join::new(
        sample::REVIEWS_ID,
        "Reviews",
        vec![JoinCondition::equals(
            ColumnRef::joined(fields::PRODUCTS_ID, "Products"),
            ColumnRef::joined(fields::REVIEWS_PRODUCT_ID, "Reviews"),
        )],
    );
    let people = facade
        .suggested_join(&orders_query(), 0, None, sample::PEOPLE_ID)
        .unwrap()
        .unwrap();

    let query = facade.join(&orders_query(), 0, orders_products_join()).unwrap();
    let query = facade.join(&query, 0, reviews).unwrap();
    let query = facade.join(&query, 0, people).unwrap();

    let query = facade.remove_join(&query, 0, 0).unwrap();

    let aliases: Vec<&str> = facade
        .joins(&query, 0)
        .unwrap()
        .iter()
        .map(|j| j.alias.as_str())
        .collect();
    assert_eq!(aliases, vec!["People - User"]);
}

#[test]
fn test_previous_stage_columns() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);
    let query = facade
        .join(&orders_query(), 0, orders_products_join().with_fields(JoinFields::None))
        .unwrap()
        .append_stage();

    // Products is not projected, so the second stage only sees Orders
    let columns = facade.lhs_columns(&query, -1, None).unwrap();
    assert_eq!(columns.len(), 9);
}

#[test]
fn test_suggested_condition_uses_given_alias() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    let condition = facade
        .suggested_condition(&orders_query(), 0, None, sample::PRODUCTS_ID, "Items")
        .unwrap();

    assert_eq!(
        condition,
        Some(JoinCondition::equals(
            ColumnRef::new(fields::ORDERS_PRODUCT_ID),
            ColumnRef::joined(fields::PRODUCTS_ID, "Items"),
        ))
    );
}

#[test]
fn test_self_referencing_suggestion_keeps_earlier_join() {
    let catalog = Catalog::from_toml_str(ORG_CATALOG).unwrap();
    let facade = QueryFacade::new(&catalog);
    let employees = Join::new(
        TableId(2),
        "Employees",
        vec![JoinCondition::equals(
            ColumnRef::new(FieldId(10)),
            ColumnRef::joined(FieldId(21), "Employees"),
        )],
    );
    let query = Query::from_table(DatabaseId(1), TableId(1));
    let query = facade.join(&query, 0, employees).unwrap();

    let join = facade
        .suggested_join(&query, 0, None, TableId(2))
        .unwrap()
        .expect("employees reference their manager");

    assert_eq!(join.alias, "Employees - Manager");
    assert_eq!(
        join.conditions[0],
        JoinCondition::equals(
            ColumnRef::joined(FieldId(22), "Employees"),
            ColumnRef::joined(FieldId(20), "Employees - Manager"),
        )
    );
}

#[test]
fn test_replace_join_with_other_table_drops_dependents() {
    let catalog = Catalog::sample();
    let facade = QueryFacade::new(&catalog);

    // Orders -> Products -> Reviews (on Products.ID)
    let reviews = Join::new(
        sample::REVIEWS_ID,
        "Reviews",
        vec![JoinCondition::equals(
            ColumnRef::joined(fields::PRODUCTS_ID, "Products"),
            ColumnRef::joined(fields::REVIEWS_PRODUCT_ID, "Reviews"),
        )],
    );
    let query = facade.join(&orders_query(), 0, orders_products_join()).unwrap();
    let query = facade.join(&query, 0, reviews).unwrap();

    let people = facade
        .suggested_join(&query, 0, Some(0), sample::PEOPLE_ID)
        .unwrap()
        .unwrap();
    let query = facade.replace_join(&query, 0, 0, people).unwrap();

    let joins = facade.joins(&query, 0).unwrap();
    assert_eq!(joins.len(), 1);
    assert_eq!(joins[0].alias, "People - User");
    assert_eq!(joins[0].target, sample::PEOPLE_ID);
}
