//! Encodes a small tree with the derive macro, then decodes hex input given on
//! the command line as a generic value.
//!
//! ```sh
//! cargo run --example tree -- c801c6c202c0c203c0
//! ```

use rlpkit::{decode, encode, Rlp, Value};

#[derive(Rlp, Debug, Default, PartialEq)]
struct Tree {
    value: u64,
    #[rlp(tail)]
    children: Vec<Tree>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tree = Tree {
        value: 1,
        children: vec![Tree { value: 2, ..Default::default() }, Tree::default()],
    };
    let encoded = encode(&tree)?;
    println!("{tree:?}\n  => {}", hex::encode(&encoded));
    assert_eq!(decode::<Tree>(&encoded)?, tree);

    for arg in std::env::args().skip(1) {
        let input = hex::decode(arg.trim_start_matches("0x")).map_err(|e| e.to_string())?;
        match decode::<Value>(&input) {
            Ok(value) => println!("{arg} => {value:?}"),
            Err(err) => println!("{arg} => {err}"),
        }
    }
    Ok(())
}
