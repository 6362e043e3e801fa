use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Greeting {
    pub message: &'static str,
}

impl Greeting {
    pub fn hello_world() -> Self {
        Greeting { message: "Hello World." }
    }
}
