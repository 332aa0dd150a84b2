pub const POEM_SYSTEM: &str = include_str!("../data/prompts/poem_system.txt");
pub const POEM_USER: &str = include_str!("../data/prompts/poem_user.txt");
