use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

pub struct TestDb {
    url: String,
}

impl TestDb {
    pub fn new_in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }

    pub fn new_file(path: impl Into<String>) -> Self {
        Self { url: path.into() }
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        Database::connect(&self.url).await
    }

    /// Connects and brings the schema up with the given migrator.
    pub async fn connect_migrated<M: MigratorTrait>(&self) -> Result<DatabaseConnection, DbErr> {
        let db = self.connect().await?;
        M::up(&db, None).await?;
        Ok(db)
    }
}
