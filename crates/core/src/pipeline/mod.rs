pub mod batch_use_case;
pub mod single_shot;
pub mod smile_service;
