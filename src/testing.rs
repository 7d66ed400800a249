//! In-memory adapters and router helpers shared by unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{response::Response, Router};
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    app::build_app,
    auth::{
        blacklist::TokenBlacklist,
        jwt::JwtKeys,
        password::hash_password,
        repo::{EmailTaken, UserStore},
        repo_types::{Role, Status, User},
    },
    cars::{
        repo::{CarFilter, CarStore},
        repo_types::{Car, ListingFields},
    },
    catalog::{
        repo::CatalogStore,
        repo_types::{Brand, Model, Series},
    },
    config::AppConfig,
    mail::MailSender,
    password_reset::repo::ResetCodeStore,
    state::{Adapters, AppState},
    storage::{avatar_key, ext_from_mime, AssetStore},
};

pub const SAMPLE_PASSWORD: &str = "Engine42x";

pub fn sample_user(email: &str) -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        image_url: None,
        country_code: "+90".into(),
        phone_number: "5551234567".into(),
        email: email.into(),
        password_hash: hash_password(SAMPLE_PASSWORD).expect("hash sample password"),
        role: Role::Regular,
        status: Status::Active,
        created_at: now,
        updated_at: now,
        last_login: now,
    }
}

pub fn sample_listing() -> ListingFields {
    ListingFields {
        title: "Clean A4, single owner".into(),
        description: "Serviced at the dealer every year.".into(),
        currency: "EUR".into(),
        price: 18500.0,
        city: "Istanbul".into(),
        district: "Kadikoy".into(),
        neighborhood: "Moda".into(),
        brand_id: 1,
        series_id: 10,
        model_id: 100,
        year: 2017,
        fuel_type: "Diesel".into(),
        transmission: "Automatic".into(),
        mileage: 120_000,
        body_type: "Sedan".into(),
        engine_power: 150,
        engine_volume: 1968,
        drive_type: "Front-Wheel Drive".into(),
        color: "Black".into(),
        warranty: false,
        heavy_damage: false,
        seller_type: "Individual".into(),
        trade_option: true,
        front_bumper: "Original".into(),
        front_hood: "Original".into(),
        roof: "Original".into(),
        front_right_door: "Painted".into(),
        rear_right_door: "Original".into(),
        front_left_mudguard: "Original".into(),
        front_left_door: "Original".into(),
        rear_left_door: "Changed".into(),
        rear_left_mudguard: "Original".into(),
        rear_bumper: "Original".into(),
    }
}

/// `Authorization` header value for `user`, signed with the test config.
pub fn bearer_for(user: &User) -> String {
    let keys = JwtKeys::from(&AppConfig::for_tests().jwt);
    format!("Bearer {}", keys.sign(user).expect("sign test token"))
}

pub async fn read_json(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn injected(what: &str) -> anyhow::Error {
    anyhow::anyhow!("injected {what} failure")
}

// --- users ---

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
    hidden: Mutex<HashSet<String>>,
    creates: AtomicUsize,
}

impl InMemoryUsers {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Makes `get_by_email` miss this address, as if another request created
    /// it between lookup and insert.
    pub fn hide_from_lookup(&self, email: &str) {
        self.hidden.lock().unwrap().insert(email.to_string());
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn create(&self, user: &User) -> anyhow::Result<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(EmailTaken(user.email.clone()).into());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        if self.hidden.lock().unwrap().contains(email) {
            return Ok(None);
        }
        Ok(self.get(email))
    }

    async fn update_password_hash(&self, email: &str, password_hash: &str) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.values_mut().find(|u| u.email == email) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(stored) = users.get_mut(&user.id) {
            // the password hash only changes through update_password_hash
            let password_hash = std::mem::take(&mut stored.password_hash);
            *stored = User {
                password_hash,
                email: stored.email.clone(),
                ..user.clone()
            };
        }
        Ok(())
    }
}

// --- blacklist ---

#[derive(Default)]
pub struct InMemoryBlacklist {
    tokens: Mutex<HashSet<String>>,
    failing: AtomicBool,
}

impl InMemoryBlacklist {
    pub fn len(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected("blacklist"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn is_blacklisted(&self, token: &str) -> anyhow::Result<bool> {
        self.check()?;
        Ok(self.tokens.lock().unwrap().contains(token))
    }

    async fn add(&self, token: &str) -> anyhow::Result<()> {
        self.check()?;
        self.tokens.lock().unwrap().insert(token.to_string());
        Ok(())
    }
}

// --- reset codes ---

#[derive(Default)]
pub struct InMemoryResetCodes {
    codes: Mutex<HashMap<String, (String, Duration)>>,
    failing_saves: AtomicBool,
    failing_consumes: AtomicBool,
}

impl InMemoryResetCodes {
    /// Active code and the TTL it was saved with.
    pub fn active(&self, email: &str) -> Option<(String, Duration)> {
        self.codes.lock().unwrap().get(email).cloned()
    }

    pub fn fail_saves(&self) {
        self.failing_saves.store(true, Ordering::SeqCst);
    }

    pub fn fail_consumes(&self) {
        self.failing_consumes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ResetCodeStore for InMemoryResetCodes {
    async fn save(&self, email: &str, code: &str, ttl: Duration) -> anyhow::Result<()> {
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(injected("reset code save"));
        }
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), (code.to_string(), ttl));
        Ok(())
    }

    async fn consume(&self, email: &str, code: &str) -> anyhow::Result<bool> {
        if self.failing_consumes.load(Ordering::SeqCst) {
            return Err(injected("reset code consume"));
        }
        let mut codes = self.codes.lock().unwrap();
        if codes.get(email).is_some_and(|(stored, _)| stored == code) {
            codes.remove(email);
            return Ok(true);
        }
        Ok(false)
    }
}

// --- mail ---

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected("smtp"));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}

// --- assets ---

#[derive(Default)]
pub struct FakeAssets {
    failing: AtomicBool,
}

impl FakeAssets {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetStore for FakeAssets {
    async fn save_avatar(&self, user_id: Uuid, _body: Bytes, content_type: &str) -> anyhow::Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected("upload"));
        }
        let ext = ext_from_mime(content_type)
            .ok_or_else(|| anyhow::anyhow!("unsupported content type {content_type}"))?;
        Ok(format!("https://fake.local/{}", avatar_key(user_id, ext)))
    }
}

// --- catalog ---

#[derive(Default)]
pub struct InMemoryCatalog {
    brands: Mutex<Vec<Brand>>,
    series: Mutex<Vec<Series>>,
    models: Mutex<Vec<Model>>,
    failing: Mutex<HashSet<CatalogLevel>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogLevel {
    Brands,
    Series,
    Models,
}

impl InMemoryCatalog {
    pub fn brand(&self, id: i32, name: &str) {
        self.brands.lock().unwrap().push(Brand {
            id,
            logo: format!("{}.png", name.to_lowercase()),
            name: name.into(),
        });
    }

    pub fn series(&self, id: i32, brand_id: i32, name: &str) {
        self.series.lock().unwrap().push(Series {
            id,
            brand_id,
            name: name.into(),
        });
    }

    pub fn model(&self, id: i32, series_id: i32, name: &str) {
        self.models.lock().unwrap().push(Model {
            id,
            series_id,
            name: name.into(),
        });
    }

    /// Lookups at `level` start failing; other levels still load.
    pub fn fail(&self, level: CatalogLevel) {
        self.failing.lock().unwrap().insert(level);
    }

    fn check(&self, level: CatalogLevel) -> anyhow::Result<()> {
        if self.failing.lock().unwrap().contains(&level) {
            return Err(injected(&format!("{level:?} query")));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_brands(&self) -> anyhow::Result<Vec<Brand>> {
        self.check(CatalogLevel::Brands)?;
        Ok(self.brands.lock().unwrap().clone())
    }

    async fn list_series(&self, brand_id: i32) -> anyhow::Result<Vec<Series>> {
        self.check(CatalogLevel::Series)?;
        Ok(self
            .series
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn list_models(&self, series_id: i32) -> anyhow::Result<Vec<Model>> {
        self.check(CatalogLevel::Models)?;
        Ok(self
            .models
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.series_id == series_id)
            .cloned()
            .collect())
    }
}

// --- cars ---

#[derive(Default)]
pub struct InMemoryCars {
    cars: Mutex<Vec<Car>>,
}

impl InMemoryCars {
    pub fn len(&self) -> usize {
        self.cars.lock().unwrap().len()
    }
}

#[async_trait]
impl CarStore for InMemoryCars {
    async fn create(&self, car: &Car) -> anyhow::Result<()> {
        self.cars.lock().unwrap().push(car.clone());
        Ok(())
    }

    async fn list(&self, filter: &CarFilter) -> anyhow::Result<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .cars
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.brand_id.map_or(true, |id| c.listing.brand_id == id))
            .filter(|c| filter.series_id.map_or(true, |id| c.listing.series_id == id))
            .filter(|c| filter.model_id.map_or(true, |id| c.listing.model_id == id))
            .cloned()
            .collect();
        cars.sort_by(|a, b| b.listing_date.cmp(&a.listing_date));
        Ok(cars
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Car>> {
        Ok(self.cars.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }
}

// --- router ---

/// Handles on the fakes behind a [`test_app`] router.
pub struct TestDeps {
    pub users: Arc<InMemoryUsers>,
    pub blacklist: Arc<InMemoryBlacklist>,
    pub codes: Arc<InMemoryResetCodes>,
    pub mailer: Arc<RecordingMailer>,
    pub assets: Arc<FakeAssets>,
    pub catalog: Arc<InMemoryCatalog>,
    pub cars: Arc<InMemoryCars>,
}

pub fn test_app() -> (Router, TestDeps) {
    let deps = TestDeps {
        users: Arc::new(InMemoryUsers::default()),
        blacklist: Arc::new(InMemoryBlacklist::default()),
        codes: Arc::new(InMemoryResetCodes::default()),
        mailer: Arc::new(RecordingMailer::default()),
        assets: Arc::new(FakeAssets::default()),
        catalog: Arc::new(InMemoryCatalog::default()),
        cars: Arc::new(InMemoryCars::default()),
    };
    let adapters = Adapters {
        users: deps.users.clone(),
        blacklist: deps.blacklist.clone(),
        reset_codes: deps.codes.clone(),
        catalog: deps.catalog.clone(),
        cars: deps.cars.clone(),
        mailer: deps.mailer.clone(),
        assets: deps.assets.clone(),
    };
    let state = AppState::from_parts(Arc::new(AppConfig::for_tests()), adapters);
    (build_app(state), deps)
}
