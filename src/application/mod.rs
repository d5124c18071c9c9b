pub mod todo_item_service;
