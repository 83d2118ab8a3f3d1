//! Display labels for choice values.
//!
//! Business logic only ever deals in machine values; presentation layers
//! resolve them through a `LabelCatalog` picked at startup.

use std::collections::HashMap;

use crate::{
    CaseStage, CaseType, ClientStatus, CommunicationType, DocumentCategory, EventType,
    NotificationType, PaymentType, TaskPriority, TaskStatus, UserRole,
};

/// Key of the sentinel shown when a case has no lawyer.
pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    locale: String,
    entries: HashMap<String, String>,
}

impl LabelCatalog {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            entries: HashMap::new(),
        }
    }

    /// Resolve a catalog by locale code, defaulting to English.
    pub fn for_locale(locale: &str) -> Self {
        match locale {
            "ru" => Self::russian(),
            _ => Self::english(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn insert(&mut self, kind: &str, value: &str, label: impl Into<String>) {
        self.entries.insert(format!("{kind}.{value}"), label.into());
    }

    /// Label for `kind.value`, or the raw value when the table has no entry.
    pub fn get<'a>(&'a self, kind: &str, value: &'a str) -> &'a str {
        self.entries
            .get(&format!("{kind}.{value}"))
            .map(String::as_str)
            .unwrap_or(value)
    }

    pub fn case_type(&self, value: CaseType) -> String {
        self.get(CaseType::KIND, value.as_str()).to_string()
    }

    pub fn case_stage(&self, value: CaseStage) -> String {
        self.get(CaseStage::KIND, value.as_str()).to_string()
    }

    pub fn task_status(&self, value: TaskStatus) -> String {
        self.get(TaskStatus::KIND, value.as_str()).to_string()
    }

    pub fn task_priority(&self, value: TaskPriority) -> String {
        self.get(TaskPriority::KIND, value.as_str()).to_string()
    }

    pub fn communication_type(&self, value: CommunicationType) -> String {
        self.get(CommunicationType::KIND, value.as_str()).to_string()
    }

    pub fn document_category(&self, value: DocumentCategory) -> String {
        self.get(DocumentCategory::KIND, value.as_str()).to_string()
    }

    pub fn event_type(&self, value: EventType) -> String {
        self.get(EventType::KIND, value.as_str()).to_string()
    }

    pub fn payment_type(&self, value: PaymentType) -> String {
        self.get(PaymentType::KIND, value.as_str()).to_string()
    }

    pub fn unassigned(&self) -> String {
        self.get("common", UNASSIGNED).to_string()
    }

    fn with_table(locale: &str, table: &[(&str, &str, &str)]) -> Self {
        let mut catalog = Self::new(locale);
        for (kind, value, label) in table {
            catalog.insert(kind, value, *label);
        }
        catalog
    }

    pub fn english() -> Self {
        Self::with_table(
            "en",
            &[
                (UserRole::KIND, "admin", "Administrator"),
                (UserRole::KIND, "manager", "Manager"),
                (UserRole::KIND, "lawyer", "Lawyer"),
                (UserRole::KIND, "client", "Client"),
                (ClientStatus::KIND, "new", "New"),
                (ClientStatus::KIND, "active", "Active"),
                (ClientStatus::KIND, "closed", "Closed"),
                (ClientStatus::KIND, "lost", "Lost"),
                (CaseType::KIND, "civil", "Civil case"),
                (CaseType::KIND, "criminal", "Criminal case"),
                (CaseType::KIND, "administrative", "Administrative case"),
                (CaseType::KIND, "arbitration", "Arbitration case"),
                (CaseType::KIND, "consultation", "Consultation"),
                (CaseStage::KIND, "consultation", "Consultation"),
                (CaseStage::KIND, "analysis", "Document analysis"),
                (CaseStage::KIND, "negotiation", "Negotiation"),
                (CaseStage::KIND, "lawsuit", "Filing a lawsuit"),
                (CaseStage::KIND, "court", "Court hearing"),
                (CaseStage::KIND, "decision", "Court decision"),
                (CaseStage::KIND, "execution", "Enforcement"),
                (CaseStage::KIND, "closed", "Closed"),
                (TaskPriority::KIND, "low", "Low"),
                (TaskPriority::KIND, "medium", "Medium"),
                (TaskPriority::KIND, "high", "High"),
                (TaskPriority::KIND, "urgent", "Urgent"),
                (TaskStatus::KIND, "todo", "To do"),
                (TaskStatus::KIND, "in_progress", "In progress"),
                (TaskStatus::KIND, "review", "In review"),
                (TaskStatus::KIND, "done", "Done"),
                (CommunicationType::KIND, "email", "Email"),
                (CommunicationType::KIND, "phone", "Phone call"),
                (CommunicationType::KIND, "meeting", "Meeting"),
                (CommunicationType::KIND, "message", "Message"),
                (CommunicationType::KIND, "document", "Document"),
                (DocumentCategory::KIND, "contract", "Contract"),
                (DocumentCategory::KIND, "lawsuit", "Statement of claim"),
                (DocumentCategory::KIND, "protocol", "Protocol"),
                (DocumentCategory::KIND, "expertise", "Expert report"),
                (DocumentCategory::KIND, "decision", "Court decision"),
                (DocumentCategory::KIND, "other", "Other"),
                (EventType::KIND, "meeting", "Meeting"),
                (EventType::KIND, "court_hearing", "Court hearing"),
                (EventType::KIND, "deadline", "Deadline"),
                (EventType::KIND, "reminder", "Reminder"),
                (EventType::KIND, "task", "Task"),
                (PaymentType::KIND, "advance", "Advance"),
                (PaymentType::KIND, "installment", "Installment"),
                (PaymentType::KIND, "final", "Final payment"),
                (PaymentType::KIND, "additional", "Additional"),
                (NotificationType::KIND, "reminder", "Reminder"),
                (NotificationType::KIND, "calendar", "Calendar"),
                ("common", UNASSIGNED, "Unassigned"),
            ],
        )
    }

    pub fn russian() -> Self {
        Self::with_table(
            "ru",
            &[
                (UserRole::KIND, "admin", "Администратор"),
                (UserRole::KIND, "manager", "Менеджер"),
                (UserRole::KIND, "lawyer", "Юрист"),
                (UserRole::KIND, "client", "Клиент"),
                (ClientStatus::KIND, "new", "Новый"),
                (ClientStatus::KIND, "active", "Активный"),
                (ClientStatus::KIND, "closed", "Закрыт"),
                (ClientStatus::KIND, "lost", "Утерян"),
                (CaseType::KIND, "civil", "Гражданское дело"),
                (CaseType::KIND, "criminal", "Уголовное дело"),
                (CaseType::KIND, "administrative", "Административное дело"),
                (CaseType::KIND, "arbitration", "Арбитражное дело"),
                (CaseType::KIND, "consultation", "Консультация"),
                (CaseStage::KIND, "consultation", "Консультация"),
                (CaseStage::KIND, "analysis", "Анализ документов"),
                (CaseStage::KIND, "negotiation", "Переговоры"),
                (CaseStage::KIND, "lawsuit", "Подача иска"),
                (CaseStage::KIND, "court", "Судебное заседание"),
                (CaseStage::KIND, "decision", "Решение суда"),
                (CaseStage::KIND, "execution", "Исполнительное производство"),
                (CaseStage::KIND, "closed", "Закрыто"),
                (TaskPriority::KIND, "low", "Низкий"),
                (TaskPriority::KIND, "medium", "Средний"),
                (TaskPriority::KIND, "high", "Высокий"),
                (TaskPriority::KIND, "urgent", "Срочный"),
                (TaskStatus::KIND, "todo", "К выполнению"),
                (TaskStatus::KIND, "in_progress", "В работе"),
                (TaskStatus::KIND, "review", "На проверке"),
                (TaskStatus::KIND, "done", "Выполнено"),
                (CommunicationType::KIND, "email", "Email"),
                (CommunicationType::KIND, "phone", "Телефонный звонок"),
                (CommunicationType::KIND, "meeting", "Встреча"),
                (CommunicationType::KIND, "message", "Сообщение"),
                (CommunicationType::KIND, "document", "Документ"),
                (DocumentCategory::KIND, "contract", "Договор"),
                (DocumentCategory::KIND, "lawsuit", "Исковое заявление"),
                (DocumentCategory::KIND, "protocol", "Протокол"),
                (DocumentCategory::KIND, "expertise", "Экспертиза"),
                (DocumentCategory::KIND, "decision", "Решение суда"),
                (DocumentCategory::KIND, "other", "Другое"),
                (EventType::KIND, "meeting", "Встреча"),
                (EventType::KIND, "court_hearing", "Судебное заседание"),
                (EventType::KIND, "deadline", "Дедлайн"),
                (EventType::KIND, "reminder", "Напоминание"),
                (EventType::KIND, "task", "Задача"),
                (PaymentType::KIND, "advance", "Аванс"),
                (PaymentType::KIND, "installment", "Рассрочка"),
                (PaymentType::KIND, "final", "Финальный платеж"),
                (PaymentType::KIND, "additional", "Дополнительный"),
                (NotificationType::KIND, "reminder", "Напоминание"),
                (NotificationType::KIND, "calendar", "Календарь"),
                ("common", UNASSIGNED, "Не назначен"),
            ],
        )
    }
}
