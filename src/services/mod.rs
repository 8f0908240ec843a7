pub mod album_service;
pub mod category_service;
pub mod control_service;
pub mod media_service;
pub mod section_service;
pub mod session_service;
pub mod settings_service;
pub mod social_service;
pub mod tag_service;
