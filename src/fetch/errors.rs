//! Анализ ошибок внешнего загрузчика
//!
//! Определяет категорию ошибки по содержимому stderr и подбирает
//! сообщение для пользователя. Сырые диагностики пользователю
//! не показываются, только классифицированные сообщения.

use thiserror::Error;

/// Ошибки этапа скачивания
#[derive(Debug, Error)]
pub enum FetchError {
    /// Видео приватное или требует авторизации
    #[error("video is private or requires authentication: {0}")]
    Private(String),

    /// Видео удалено или заблокировано
    #[error("video unavailable: {0}")]
    Unavailable(String),

    /// Видео не существует
    #[error("video not found: {0}")]
    NotFound(String),

    /// Скачивание не уложилось в таймаут и было прервано
    #[error("fetch timed out after {0}s")]
    TimedOut(u64),

    /// Неклассифицированная ошибка инструмента
    #[error("fetch failed: {0}")]
    Unknown(String),

    /// Загрузчик не удалось запустить
    #[error("failed to start {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    /// Инструмент завершился успешно, но файла с нужным префиксом нет
    #[error("no output file found for prefix {0}")]
    MissingOutput(String),
}

/// Классифицирует stderr загрузчика в категорию ошибки
///
/// Подстроки проверяются без учета регистра в фиксированном порядке
/// приоритета: приватное видео раньше недоступного, недоступное раньше
/// отсутствующего. Первое совпадение выигрывает.
///
/// # Параметры
/// - `stderr`: накопленный хвост stderr загрузчика
///
/// # Возвращает
/// - `FetchError` соответствующей категории с деталями внутри
pub fn classify_fetch_error(stderr: &str) -> FetchError {
    let stderr_lower = stderr.to_lowercase();
    let detail = stderr.trim().to_string();

    // Приватные видео и все, что требует входа в аккаунт
    if stderr_lower.contains("private")
        || stderr_lower.contains("login")
        || stderr_lower.contains("sign in")
        || stderr_lower.contains("members-only")
        || stderr_lower.contains("account")
    {
        return FetchError::Private(detail);
    }

    // Удаленные и заблокированные видео
    if stderr_lower.contains("unavailable")
        || stderr_lower.contains("removed")
        || stderr_lower.contains("deleted")
        || stderr_lower.contains("terminated")
    {
        return FetchError::Unavailable(detail);
    }

    // Несуществующие видео
    if stderr_lower.contains("not found")
        || stderr_lower.contains("404")
        || stderr_lower.contains("does not exist")
        || stderr_lower.contains("no video")
    {
        return FetchError::NotFound(detail);
    }

    FetchError::Unknown(detail)
}

/// Возвращает пользовательское сообщение об ошибке скачивания
///
/// # Параметры
/// - `error`: классифицированная ошибка
///
/// # Возвращает
/// - `String`: сообщение для пользователя
pub fn user_message(error: &FetchError) -> String {
    match error {
        FetchError::Private(_) => {
            "❌ Видео недоступно без входа.\n\nПохоже, ссылка приватная или требует авторизации.".to_string()
        }
        FetchError::Unavailable(_) => {
            "❌ Видео недоступно.\n\nВозможно оно удалено или заблокировано в твоём регионе.".to_string()
        }
        FetchError::NotFound(_) | FetchError::MissingOutput(_) => {
            "❌ Видео не найдено.\n\nПроверь, что ссылка корректна.".to_string()
        }
        FetchError::TimedOut(_) => {
            "❌ Скачивание шло слишком долго и было остановлено.\n\nПопробуй качество пониже.".to_string()
        }
        FetchError::Unknown(_) | FetchError::Spawn { .. } => {
            "❌ Ошибка при скачивании.\n\nПопробуй ещё раз или пришли другую ссылку.".to_string()
        }
    }
}
