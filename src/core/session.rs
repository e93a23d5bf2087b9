use dashmap::DashSet;
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::{ChatId, MessageId};
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::core::config;

/// Отложенный запрос: ссылка, ожидающая выбора качества.
///
/// Создается при получении валидной ссылки, живет до выбора качества,
/// истечения TTL или новой ссылки от того же пользователя.
#[derive(Clone, Debug)]
pub struct PendingRequest {
    /// Ссылка, которую прислал пользователь
    pub url: String,
    /// Чат, в котором пришла ссылка
    pub chat_id: ChatId,
    /// Сообщение с меню выбора качества (редактируется в статус)
    pub menu_message_id: MessageId,
    created_at: Instant,
}

impl PendingRequest {
    /// Создает запрос с текущей временной меткой.
    pub fn new(url: String, chat_id: ChatId, menu_message_id: MessageId) -> Self {
        Self {
            url,
            chat_id,
            menu_message_id,
            created_at: Instant::now(),
        }
    }

    /// Возвращает `true`, если запрос старше `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// RAII-страж эксклюзивности: пока он жив, у пользователя есть
/// активная загрузка. Снимает флаг при `Drop`, в том числе при панике
/// внутри конвейера.
pub struct InFlightGuard {
    in_flight: Arc<DashSet<i64>>,
    user_id: i64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.user_id);
    }
}

/// Хранилище сессий: отложенные запросы и флаги активных загрузок.
///
/// Вся информация живет в памяти процесса и теряется при рестарте.
/// Для каждого пользователя одновременно существует не больше одного
/// отложенного запроса и не больше одной активной загрузки.
#[derive(Clone)]
pub struct SessionStore {
    /// Отложенные запросы по идентификатору пользователя
    pending: Arc<Mutex<HashMap<i64, PendingRequest>>>,
    /// Пользователи с активной загрузкой
    in_flight: Arc<DashSet<i64>>,
    /// Время жизни отложенного запроса
    ttl: Duration,
}

impl SessionStore {
    /// Создает хранилище с TTL из конфигурации.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kachalka::core::session::SessionStore;
    ///
    /// let sessions = SessionStore::new();
    /// ```
    pub fn new() -> Self {
        Self::with_ttl(config::session::request_ttl())
    }

    /// Создает хранилище с кастомным TTL.
    ///
    /// # Arguments
    ///
    /// * `ttl` - Время жизни отложенного запроса
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(DashSet::new()),
            ttl,
        }
    }

    /// Сохраняет отложенный запрос пользователя.
    ///
    /// Новая ссылка вытесняет предыдущую, даже если та еще не истекла.
    ///
    /// # Arguments
    ///
    /// * `user_id` - Идентификатор пользователя
    /// * `request` - Запрос с ссылкой и идентификатором меню
    pub async fn store_request(&self, user_id: i64, request: PendingRequest) {
        let mut pending = self.pending.lock().await;
        pending.insert(user_id, request);
    }

    /// Забирает отложенный запрос пользователя.
    ///
    /// Запрос удаляется из хранилища. Истекший запрос считается
    /// отсутствующим и тоже удаляется.
    ///
    /// # Returns
    ///
    /// `Some(PendingRequest)` если есть непросроченный запрос, иначе `None`.
    pub async fn take_request(&self, user_id: i64) -> Option<PendingRequest> {
        let mut pending = self.pending.lock().await;
        let request = pending.remove(&user_id)?;
        if request.is_expired(self.ttl) {
            return None;
        }
        Some(request)
    }

    /// Пытается начать загрузку для пользователя.
    ///
    /// # Returns
    ///
    /// `Some(InFlightGuard)` если у пользователя нет активной загрузки,
    /// `None` если загрузка уже идет. Флаг снимается при `Drop` стража.
    pub fn try_begin(&self, user_id: i64) -> Option<InFlightGuard> {
        if self.in_flight.insert(user_id) {
            Some(InFlightGuard {
                in_flight: Arc::clone(&self.in_flight),
                user_id,
            })
        } else {
            None
        }
    }

    /// Возвращает `true`, если у пользователя есть активная загрузка.
    pub fn is_in_flight(&self, user_id: i64) -> bool {
        self.in_flight.contains(&user_id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
