use stockroom_db::{
    create_pool, run_migrations, DatabaseUrl, DbRuntimeSettings, Session, DEFAULT_DATABASE_URL,
};

#[test]
fn default_url_is_a_relative_sqlite_file() {
    let url = DatabaseUrl::parse(DEFAULT_DATABASE_URL).expect("default URL should parse");
    assert_eq!(url, DatabaseUrl::File("./stock.db".into()));
}

#[test]
fn db_initialization_works() {
    let pool = create_pool(&DatabaseUrl::Memory, DbRuntimeSettings::default())
        .expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 3);

    // Verify table list (excluding sqlite internals)
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )
        .expect("failed to prepare table list query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table list query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(
        tables,
        vec![
            "_stockroom_migrations",
            "customers",
            "products",
            "suppliers",
            "transactions",
        ]
    );
}

#[test]
fn url_to_session_round_trip() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let raw = format!("sqlite:///{}", dir.path().join("stock.db").display());
    let url = DatabaseUrl::parse(&raw).expect("absolute file URL should parse");

    let pool = create_pool(&url, DbRuntimeSettings::default()).expect("failed to create pool");
    run_migrations(&pool.get().expect("failed to get connection"))
        .expect("failed to run migrations");

    let session = Session::begin(&pool).expect("failed to begin session");
    session
        .execute(
            "INSERT INTO suppliers (name, contact) VALUES ('Acme', '555-0100')",
            [],
        )
        .expect("failed to insert supplier");
    session.commit().expect("failed to commit");

    let session = Session::begin(&pool).expect("failed to begin session");
    let name: String = session
        .query_row(
            "SELECT name FROM suppliers WHERE contact = '555-0100'",
            [],
            |row| row.get(0),
        )
        .expect("failed to read supplier back");
    assert_eq!(name, "Acme");
}
