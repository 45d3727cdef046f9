//! Local copies of the server collections.

use std::sync::Arc;

use crate::{
    Category, ChartDataPoint, DataView, NewCategory, NewTransaction, Settings, SettingsPatch,
    Transaction, TransactionId, TransactionKind, TransactionListQuery, TransactionPatch, breakdown,
    client::{Api, ClientError},
};

/// The transactions last fetched from the server, most recent first.
#[derive(Debug)]
pub struct TransactionStore<A> {
    api: Arc<A>,
    transactions: Vec<Transaction>,
    error: Option<String>,
    is_loading: bool,
}

impl<A: Api> TransactionStore<A> {
    /// Create an empty store that talks to the server through `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            transactions: Vec::new(),
            error: None,
            is_loading: false,
        }
    }

    /// The transactions in the store.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The message of the last failed operation, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a fetch is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replace the stored transactions with those matching `query`.
    ///
    /// If the request fails the error is recorded and the previous
    /// transactions are kept.
    pub async fn fetch(&mut self, query: &TransactionListQuery) {
        self.is_loading = true;

        match self.api.list_transactions(query).await {
            Ok(views) => {
                self.transactions = views.into_iter().map(|view| view.transaction).collect();
                self.error = None;
            }
            Err(error) => {
                tracing::warn!("Could not fetch transactions: {error}");
                self.error = Some(error.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Create a transaction and add it to the front of the store once the
    /// server has confirmed it.
    ///
    /// # Errors
    /// Returns the error from the server, the store is left unchanged.
    pub async fn create(
        &mut self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, ClientError> {
        let result = self.api.create_transaction(transaction).await;

        match &result {
            Ok(created) => {
                self.transactions.insert(0, created.clone());
                self.error = None;
            }
            Err(error) => self.error = Some(error.to_string()),
        }

        result
    }

    /// Apply `patch` to the stored transaction straight away, then replace it
    /// with the server's copy.
    ///
    /// # Errors
    /// Returns the error from the server after restoring the transaction as it
    /// was before the update.
    pub async fn update(
        &mut self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, ClientError> {
        let index = self.position(id);
        let previous = index.map(|index| {
            let previous = self.transactions[index].clone();
            patch.apply_to(&mut self.transactions[index]);
            previous
        });

        match self.api.update_transaction(id, patch).await {
            Ok(updated) => {
                if let Some(index) = index {
                    self.transactions[index] = updated.clone();
                }
                self.error = None;

                Ok(updated)
            }
            Err(error) => {
                if let (Some(index), Some(previous)) = (index, previous) {
                    self.transactions[index] = previous;
                }
                self.error = Some(error.to_string());

                Err(error)
            }
        }
    }

    /// Remove the transaction from the store straight away, then delete it on
    /// the server.
    ///
    /// # Errors
    /// Returns the error from the server after putting the transaction back at
    /// its original position.
    pub async fn delete(&mut self, id: TransactionId) -> Result<(), ClientError> {
        let removed = self
            .position(id)
            .map(|index| (index, self.transactions.remove(index)));

        match self.api.delete_transaction(id).await {
            Ok(()) => {
                self.error = None;
                Ok(())
            }
            Err(error) => {
                if let Some((index, transaction)) = removed {
                    self.transactions.insert(index, transaction);
                }
                self.error = Some(error.to_string());

                Err(error)
            }
        }
    }

    fn position(&self, id: TransactionId) -> Option<usize> {
        self.transactions
            .iter()
            .position(|transaction| transaction.id == id)
    }
}

/// The categories last fetched from the server, in display order.
#[derive(Debug)]
pub struct CategoryStore<A> {
    api: Arc<A>,
    categories: Vec<Category>,
    error: Option<String>,
    is_loading: bool,
}

impl<A: Api> CategoryStore<A> {
    /// Create an empty store that talks to the server through `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            categories: Vec::new(),
            error: None,
            is_loading: false,
        }
    }

    /// The categories in the store.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The categories for one kind of transaction, in display order.
    pub fn categories_of_kind(&self, kind: TransactionKind) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.kind == kind)
            .collect()
    }

    /// The message of the last failed operation, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a fetch is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replace the stored categories with the server's.
    ///
    /// If the request fails the error is recorded and the previous
    /// categories are kept.
    pub async fn fetch(&mut self) {
        self.is_loading = true;

        match self.api.list_categories().await {
            Ok(categories) => {
                self.categories = categories;
                self.error = None;
            }
            Err(error) => {
                tracing::warn!("Could not fetch categories: {error}");
                self.error = Some(error.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Create a category and add it to the end of the store once the server
    /// has confirmed it.
    ///
    /// # Errors
    /// Returns the error from the server, the store is left unchanged.
    pub async fn create(&mut self, category: &NewCategory) -> Result<Category, ClientError> {
        let result = self.api.create_category(category).await;

        match &result {
            Ok(created) => {
                self.categories.push(created.clone());
                self.error = None;
            }
            Err(error) => self.error = Some(error.to_string()),
        }

        result
    }
}

/// The settings last fetched from the server.
#[derive(Debug)]
pub struct SettingsStore<A> {
    api: Arc<A>,
    settings: Option<Settings>,
    error: Option<String>,
    is_loading: bool,
}

impl<A: Api> SettingsStore<A> {
    /// Create an empty store that talks to the server through `api`.
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            settings: None,
            error: None,
            is_loading: false,
        }
    }

    /// The settings, `None` until they have been fetched.
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// The message of the last failed operation, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a fetch is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replace the stored settings with the server's.
    ///
    /// If the request fails the error is recorded and the previous settings
    /// are kept.
    pub async fn fetch(&mut self) {
        self.is_loading = true;

        match self.api.get_settings().await {
            Ok(settings) => {
                self.settings = Some(settings);
                self.error = None;
            }
            Err(error) => {
                tracing::warn!("Could not fetch settings: {error}");
                self.error = Some(error.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Apply `patch` to the stored settings straight away, then replace them
    /// with the server's copy.
    ///
    /// # Errors
    /// Returns the error from the server after restoring the previous settings.
    pub async fn update(&mut self, patch: &SettingsPatch) -> Result<Settings, ClientError> {
        let previous = self.settings.clone();
        if let Some(settings) = &mut self.settings {
            apply_settings_patch(patch, settings);
        }

        match self.api.update_settings(patch).await {
            Ok(updated) => {
                self.settings = Some(updated.clone());
                self.error = None;

                Ok(updated)
            }
            Err(error) => {
                self.settings = previous;
                self.error = Some(error.to_string());

                Err(error)
            }
        }
    }
}

fn apply_settings_patch(patch: &SettingsPatch, settings: &mut Settings) {
    if let Some(period) = patch.default_period {
        settings.default_period = period;
    }

    if let Some(chart_type) = patch.default_chart_type {
        settings.default_chart_type = chart_type;
    }

    if let Some(data_view) = patch.default_data_view {
        settings.default_data_view = data_view;
    }

    if let Some(currency) = &patch.currency {
        settings.currency = currency.clone();
    }
}

/// One store per server collection, sharing a single [Api].
#[derive(Debug)]
pub struct Stores<A> {
    /// The transactions.
    pub transactions: TransactionStore<A>,
    /// The categories.
    pub categories: CategoryStore<A>,
    /// The settings.
    pub settings: SettingsStore<A>,
}

impl<A: Api> Stores<A> {
    /// Create empty stores that talk to the server through `api`.
    pub fn new(api: A) -> Self {
        let api = Arc::new(api);

        Self {
            transactions: TransactionStore::new(api.clone()),
            categories: CategoryStore::new(api.clone()),
            settings: SettingsStore::new(api),
        }
    }

    /// The category breakdown of the stored transactions shown in `view`.
    pub fn breakdown(&self, view: DataView) -> Vec<ChartDataPoint> {
        let transactions: Vec<Transaction> = self
            .transactions
            .transactions()
            .iter()
            .filter(|transaction| transaction.kind == view.kind())
            .cloned()
            .collect();

        breakdown(&transactions, self.categories.categories())
    }
}

#[cfg(test)]
mod store_tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use time::macros::datetime;

    use crate::{
        Category, CategoryName, Color, Currency, DataView, NewCategory, NewTransaction, Period,
        Settings, SettingsPatch, Transaction, TransactionId, TransactionKind,
        TransactionListQuery, TransactionPatch, TransactionView,
        client::{Api, ClientError, Stores},
    };

    /// An in-memory stand-in for the server that can be told to fail.
    #[derive(Default)]
    struct FakeApi {
        transactions: Mutex<Vec<Transaction>>,
        categories: Mutex<Vec<Category>>,
        fail: AtomicBool,
    }

    impl FakeApi {
        fn check(&self) -> Result<(), ClientError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(ClientError::Api {
                    status: 503,
                    message: "the database is unavailable".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn transaction(
        id: TransactionId,
        kind: TransactionKind,
        amount: f64,
        category_id: i64,
    ) -> Transaction {
        Transaction {
            id,
            kind,
            amount,
            category_id,
            description: format!("transaction {id}"),
            date: datetime!(2025-03-15 12:00 UTC),
            created_at: datetime!(2025-03-15 12:00 UTC),
            updated_at: datetime!(2025-03-15 12:00 UTC),
        }
    }

    fn category(id: i64, name: &str, kind: TransactionKind) -> Category {
        Category {
            id,
            name: CategoryName::new_unchecked(name),
            icon: "🔷".to_owned(),
            color: Color::new_unchecked("#8B5CF6"),
            kind,
            is_default: true,
            order: id as u32,
            created_at: datetime!(2025-01-01 00:00 UTC),
            updated_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    fn settings() -> Settings {
        Settings {
            default_period: Period::Monthly,
            default_chart_type: Default::default(),
            default_data_view: DataView::Expenses,
            currency: Currency::default(),
            created_at: datetime!(2025-01-01 00:00 UTC),
            updated_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    impl Api for FakeApi {
        async fn list_transactions(
            &self,
            _query: &TransactionListQuery,
        ) -> Result<Vec<TransactionView>, ClientError> {
            self.check()?;

            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .map(|transaction| TransactionView {
                    transaction: transaction.clone(),
                    category: None,
                })
                .collect())
        }

        async fn create_transaction(
            &self,
            new: &NewTransaction,
        ) -> Result<Transaction, ClientError> {
            self.check()?;

            let mut transactions = self.transactions.lock().unwrap();
            let created = Transaction {
                description: new.description.clone(),
                ..transaction(transactions.len() as i64 + 1, new.kind, new.amount, new.category_id)
            };
            transactions.insert(0, created.clone());

            Ok(created)
        }

        async fn update_transaction(
            &self,
            id: TransactionId,
            patch: &TransactionPatch,
        ) -> Result<Transaction, ClientError> {
            self.check()?;

            let mut transactions = self.transactions.lock().unwrap();
            let stored = transactions
                .iter_mut()
                .find(|transaction| transaction.id == id)
                .ok_or(ClientError::Api {
                    status: 404,
                    message: "not found".to_owned(),
                })?;
            patch.apply_to(stored);
            stored.updated_at = datetime!(2025-03-16 12:00 UTC);

            Ok(stored.clone())
        }

        async fn delete_transaction(&self, id: TransactionId) -> Result<(), ClientError> {
            self.check()?;

            self.transactions
                .lock()
                .unwrap()
                .retain(|transaction| transaction.id != id);

            Ok(())
        }

        async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
            self.check()?;

            Ok(self.categories.lock().unwrap().clone())
        }

        async fn create_category(&self, new: &NewCategory) -> Result<Category, ClientError> {
            self.check()?;

            let mut categories = self.categories.lock().unwrap();
            let created = category(categories.len() as i64 + 1, new.name.as_ref(), new.kind);
            categories.push(created.clone());

            Ok(created)
        }

        async fn get_settings(&self) -> Result<Settings, ClientError> {
            self.check()?;

            Ok(settings())
        }

        async fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, ClientError> {
            self.check()?;

            let mut updated = settings();
            if let Some(period) = patch.default_period {
                updated.default_period = period;
            }

            Ok(updated)
        }
    }

    fn seeded_api() -> FakeApi {
        FakeApi {
            transactions: Mutex::new(vec![
                transaction(3, TransactionKind::Expense, 30.0, 1),
                transaction(2, TransactionKind::Income, 100.0, 2),
                transaction(1, TransactionKind::Expense, 10.0, 1),
            ]),
            categories: Mutex::new(vec![
                category(1, "Food", TransactionKind::Expense),
                category(2, "Salary", TransactionKind::Income),
            ]),
            fail: AtomicBool::new(false),
        }
    }

    async fn fetched_stores() -> Stores<FakeApi> {
        let mut stores = Stores::new(seeded_api());
        stores
            .transactions
            .fetch(&TransactionListQuery::default())
            .await;
        stores.categories.fetch().await;
        stores.settings.fetch().await;

        stores
    }

    fn ids(stores: &Stores<FakeApi>) -> Vec<TransactionId> {
        stores
            .transactions
            .transactions()
            .iter()
            .map(|transaction| transaction.id)
            .collect()
    }

    fn set_failing(stores: &Stores<FakeApi>, fail: bool) {
        stores.transactions.api.fail.store(fail, Ordering::SeqCst);
    }

    #[tokio::test]
    async fn fetch_replaces_contents() {
        let stores = fetched_stores().await;

        assert_eq!(ids(&stores), [3, 2, 1]);
        assert_eq!(stores.categories.categories().len(), 2);
        assert!(stores.settings.settings().is_some());
        assert_eq!(stores.transactions.error(), None);
        assert!(!stores.transactions.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_contents_and_sets_error() {
        let mut stores = fetched_stores().await;
        set_failing(&stores, true);

        stores
            .transactions
            .fetch(&TransactionListQuery::default())
            .await;
        stores.categories.fetch().await;

        assert_eq!(ids(&stores), [3, 2, 1]);
        assert!(stores.transactions.error().is_some());
        assert!(stores.categories.error().is_some());
        assert_eq!(stores.categories.categories().len(), 2);
        assert!(!stores.transactions.is_loading());
    }

    #[tokio::test]
    async fn create_prepends_transaction() {
        let mut stores = fetched_stores().await;

        let created = stores
            .transactions
            .create(&NewTransaction {
                kind: TransactionKind::Expense,
                amount: 5.0,
                category_id: 1,
                description: "Coffee".to_owned(),
                date: None,
            })
            .await
            .unwrap();

        assert_eq!(stores.transactions.transactions()[0], created);
        assert_eq!(stores.transactions.transactions().len(), 4);
    }

    #[tokio::test]
    async fn failed_create_leaves_store_unchanged() {
        let mut stores = fetched_stores().await;
        set_failing(&stores, true);

        let result = stores
            .transactions
            .create(&NewTransaction {
                kind: TransactionKind::Expense,
                amount: 5.0,
                category_id: 1,
                description: String::new(),
                date: None,
            })
            .await;

        assert!(result.is_err());
        assert_eq!(ids(&stores), [3, 2, 1]);
        assert!(stores.transactions.error().is_some());
    }

    #[tokio::test]
    async fn update_replaces_with_server_record() {
        let mut stores = fetched_stores().await;
        let patch = TransactionPatch {
            amount: Some(42.0),
            ..Default::default()
        };

        let updated = stores.transactions.update(2, &patch).await.unwrap();

        assert_eq!(updated.amount, 42.0);
        assert_eq!(stores.transactions.transactions()[1], updated);
        assert_eq!(
            stores.transactions.transactions()[1].updated_at,
            datetime!(2025-03-16 12:00 UTC)
        );
    }

    #[tokio::test]
    async fn failed_update_restores_previous_record() {
        let mut stores = fetched_stores().await;
        let before = stores.transactions.transactions()[1].clone();
        set_failing(&stores, true);
        let patch = TransactionPatch {
            amount: Some(42.0),
            description: Some("changed".to_owned()),
            ..Default::default()
        };

        let result = stores.transactions.update(2, &patch).await;

        assert!(result.is_err());
        assert_eq!(stores.transactions.transactions()[1], before);
        assert!(stores.transactions.error().is_some());
    }

    #[tokio::test]
    async fn delete_removes_transaction() {
        let mut stores = fetched_stores().await;

        stores.transactions.delete(2).await.unwrap();

        assert_eq!(ids(&stores), [3, 1]);
    }

    #[tokio::test]
    async fn failed_delete_reinserts_at_original_position() {
        let mut stores = fetched_stores().await;
        set_failing(&stores, true);

        let result = stores.transactions.delete(2).await;

        assert!(result.is_err());
        assert_eq!(ids(&stores), [3, 2, 1]);
        assert!(stores.transactions.error().is_some());
    }

    #[tokio::test]
    async fn create_appends_category() {
        let mut stores = fetched_stores().await;

        let created = stores
            .categories
            .create(&NewCategory::new(
                CategoryName::new_unchecked("Pets"),
                TransactionKind::Expense,
            ))
            .await
            .unwrap();

        assert_eq!(stores.categories.categories().last(), Some(&created));
        let expense_names: Vec<_> = stores
            .categories
            .categories_of_kind(TransactionKind::Expense)
            .iter()
            .map(|category| category.name.to_string())
            .collect();
        assert_eq!(expense_names, ["Food", "Pets"]);
    }

    #[tokio::test]
    async fn failed_settings_update_restores_previous() {
        let mut stores = fetched_stores().await;
        set_failing(&stores, true);

        let result = stores
            .settings
            .update(&SettingsPatch {
                default_period: Some(Period::Yearly),
                ..Default::default()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(stores.settings.settings(), Some(&settings()));
    }

    #[tokio::test]
    async fn settings_update_uses_server_record() {
        let mut stores = fetched_stores().await;

        let updated = stores
            .settings
            .update(&SettingsPatch {
                default_period: Some(Period::Weekly),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.default_period, Period::Weekly);
        assert_eq!(stores.settings.settings(), Some(&updated));
    }

    #[tokio::test]
    async fn breakdown_joins_transactions_and_categories() {
        let stores = fetched_stores().await;

        let expenses = stores.breakdown(DataView::Expenses);
        let incomes = stores.breakdown(DataView::Incomes);

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].label, "Food");
        assert_eq!(expenses[0].value, 40.0);
        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0].label, "Salary");
        assert_eq!(incomes[0].percentage, 100.0);
    }
}
