//! Все строки, которые видит пользователь.
//!
//! Держим их в одном месте, чтобы тон и эмодзи были одинаковыми во всех
//! обработчиках. Тексты на русском, как и аудитория бота.

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Этапные статусы; сообщение-статус редактируется по ходу доставки.
pub const STATUS_FETCHING: &str = "⏳ Скачиваю...";
pub const STATUS_COMPRESSING: &str = "🗜 Сжимаю видео...";
pub const STATUS_UPLOADING: &str = "☁️ Загружаю в облако...";
pub const STATUS_SENDING: &str = "📤 Отправляю...";

/// Приглашение выбрать качество под присланной ссылкой.
pub const QUALITY_PROMPT: &str = "🎬 Выбери качество:";

/// Ответ на повторный запрос, пока предыдущий ещё в работе.
pub const ALREADY_IN_FLIGHT: &str = "⏳ Уже качаю твоё видео, подожди.";

/// Кнопка нажата, а ссылки уже нет (истекла или бот перезапускался).
pub const REQUEST_EXPIRED: &str = "🤔 Не нашёл твою ссылку. Пришли её ещё раз.";

/// Ответ на ссылку с неподдерживаемого сайта.
pub const UNSUPPORTED_LINK: &str =
    "❌ Не могу скачать отсюда.\n\nПришли ссылку на YouTube, Instagram, TikTok или Facebook.";

/// Приветствие `/start`; лимит подставляется из конфигурации.
pub fn start_text(inline_limit_mb: u64) -> String {
    format!(
        "👋 Отправь ссылку на видео\n\n\
         YouTube / Shorts / Instagram / TikTok / Facebook\n\
         До {limit}MB — пришлю файлом\n\
         Больше {limit}MB — сожму или дам ссылку",
        limit = inline_limit_mb
    )
}

/// Справка `/help`.
pub fn help_text(inline_limit_mb: u64) -> String {
    format!(
        "ℹ️ Как пользоваться:\n\n\
         1. Пришли ссылку на видео\n\
         2. Выбери качество кнопкой\n\
         3. Жди файл или ссылку\n\n\
         Видео до {limit}MB приходит файлом, больше — сжимается или\n\
         выгружается в облако.",
        limit = inline_limit_mb
    )
}

/// Подпись к сжатому видео: сколько было и сколько стало.
pub fn compressed_caption(from_bytes: u64, to_bytes: u64) -> String {
    format!(
        "🗜 Сжал видео: {} MB → {} MB",
        from_bytes / 1_048_576,
        to_bytes / 1_048_576
    )
}

/// Файл уехал в облако; даём ссылку на скачивание.
pub fn remote_link(size_bytes: u64, url: &str) -> String {
    format!(
        "☁️ Видео слишком большое для отправки файлом ({:.1} MB).\n\nСкачать можно здесь:\n{}",
        size_bytes as f64 / BYTES_PER_MB,
        url
    )
}

/// Все варианты доставки исчерпаны; отдаём исходную ссылку.
pub fn size_exceeded(size_bytes: u64, source_url: &str) -> String {
    format!(
        "❌ Видео слишком большое: {:.1} MB\n\nВот ссылка для скачивания:\n{}",
        size_bytes as f64 / BYTES_PER_MB,
        source_url
    )
}

/// Непредвиденная ошибка; деталь обрезается по символам, не по байтам.
pub fn unexpected_error(detail: &str, max_chars: usize) -> String {
    let truncated: String = detail.chars().take(max_chars).collect();
    format!("❌ Ошибка: {}", truncated)
}
