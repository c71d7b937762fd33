// Macros file - tracing macros are imported within the macro definitions

/// Standardized logging macros for consistent field names and message patterns across the application
///
/// These macros ensure:
/// - Consistent field naming conventions
/// - Appropriate logging levels for different scenarios
/// - Structured logging with context

// ============================================================================
// API Operation Logging Macros
// ============================================================================

/// Log the start of an API operation with consistent fields
#[macro_export]
macro_rules! log_api_start {
    ($operation:expr, topic = $topic:expr) => {
        tracing::debug!(
            operation = $operation,
            topic = %$topic,
            "API operation started"
        );
    };
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API operation started");
    };
}

/// Log successful completion of an API operation
#[macro_export]
macro_rules! log_api_success {
    ($operation:expr, topic = $topic:expr, source = $source:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            topic = %$topic,
            source = ?$source,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, count = $count:expr, $msg:expr) => {
        tracing::info!(
            operation = $operation,
            count = $count,
            "API operation completed: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::info!(operation = $operation, "API operation completed: {}", $msg);
    };
}

/// Log API warnings with context
#[macro_export]
macro_rules! log_api_warn {
    ($operation:expr, error = $error:expr, $msg:expr) => {
        tracing::warn!(
            operation = $operation,
            error = %$error,
            "API operation warning: {}", $msg
        );
    };
    ($operation:expr, $msg:expr) => {
        tracing::warn!(operation = $operation, "API operation warning: {}", $msg);
    };
}

// ============================================================================
// Question Generation Logging Macros
// ============================================================================

/// Log the stages of a single question generation
#[macro_export]
macro_rules! log_generation {
    (start, request_id = $id:expr, topic = $topic:expr, difficulty = $difficulty:expr) => {
        tracing::info!(
            component = "question_service",
            request_id = %$id,
            topic = %$topic,
            difficulty = %$difficulty,
            "Question generation started"
        );
    };
    (accepted, request_id = $id:expr, provider = $provider:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = "question_service",
            request_id = %$id,
            provider = %$provider,
            duration_ms = $duration,
            source = "generated",
            "Generated question accepted"
        );
    };
    (fallback, request_id = $id:expr, reason = $reason:expr, duration_ms = $duration:expr) => {
        tracing::warn!(
            component = "question_service",
            request_id = %$id,
            reason = $reason.code(),
            error = %$reason,
            duration_ms = $duration,
            source = "fallback",
            "Serving fallback question"
        );
    };
}

// ============================================================================
// System Event Logging Macros
// ============================================================================

/// Log system startup and shutdown events
#[macro_export]
macro_rules! log_system_event {
    (startup, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "startup",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (shutdown, component = $component:expr, $msg:expr) => {
        tracing::info!(
            event_type = "shutdown",
            component = $component,
            "System event: {}",
            $msg
        );
    };
    (config, $msg:expr) => {
        tracing::info!(event_type = "configuration", "System event: {}", $msg);
    };
}

// ============================================================================
// Validation Logging Macros
// ============================================================================

/// Log validation results consistently
#[macro_export]
macro_rules! log_validation {
    (success, $component:expr, $msg:expr) => {
        tracing::debug!(
            event_type = "validation",
            component = $component,
            result = "success",
            "Validation completed: {}", $msg
        );
    };
    (failure, $component:expr, error = $error:expr) => {
        tracing::warn!(
            event_type = "validation",
            component = $component,
            result = "failure",
            error = %$error,
            "Validation failed"
        );
    };
}
