//! UI Components

mod auth_form;
mod delete_confirm_button;
mod new_task_form;
mod task_card;
mod task_manager;

pub use auth_form::AuthForm;
pub use delete_confirm_button::DeleteConfirmButton;
pub use new_task_form::NewTaskForm;
pub use task_card::TaskCard;
pub use task_manager::TaskManager;
