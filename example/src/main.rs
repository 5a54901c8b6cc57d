use cayley::{MatResult, Matrix};
use rand::Rng;

fn main() -> MatResult<()> {
    let mut m1 = Matrix::<i32>::zeros(5, 5)?;
    let mut m2 = Matrix::<i32>::zeros(5, 5)?;
    let mut rng = rand::thread_rng();

    for i in 0..m1.rows() {
        for j in 0..m1.cols() {
            m1[(i, j)] = rng.gen_range(0..=10);
            m2[(i, j)] = rng.gen_range(0..=10);
        }
    }

    println!("{}", m1);
    println!("{}", m2);

    m2.try_add_assign(&m1)?;

    println!("{}", m2);

    Ok(())
}
