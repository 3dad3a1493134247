/// Example: orient a cubic crystal on a six-circle and drive to a reflection
///
/// Two reference reflections give U and UB; the bisecting four-circle mode
/// then puts (1,1,0) in diffraction and the result is mapped back to hkl.
use diffcalc_core::lattice::cubic_lattice;
use diffcalc_core::{CalculationSession, SessionConfig};
use nalgebra::Vector3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Orienting a cubic crystal ===\n");

    let mut session = CalculationSession::new(SessionConfig::default())?;
    session.set_wavelength(1.0)?;

    // 1. Lattice
    let lattice = cubic_lattice(1.0)?.with_name("cubic test crystal");
    println!("1. Lattice: {:?}", lattice.crystal_system());
    println!("   B =\n{}", lattice.b_matrix());
    session.state_mut().set_lattice(&lattice);

    // 2. Reference reflections at mu, delta, nu, eta, chi, phi
    session.add_reflection(Vector3::new(1.0, 0.0, 0.0), &[0.0, 60.0, 0.0, 30.0, 0.0, 0.0], Some("first"))?;
    session.add_reflection(Vector3::new(0.0, 1.0, 0.0), &[0.0, 60.0, 0.0, 30.0, 0.0, 90.0], Some("second"))?;
    let fit = session.calculate_ub()?;
    println!("2. {:?} fit, residuals {:?}", fit.method, fit.residuals);
    println!("   UB =\n{}", fit.orientation.ub);

    // 3. Bisecting mode with the incidence and exit circles at zero
    session.select_mode("4cBeq")?;
    session.set_parameter("alpha", 0.0)?;
    session.set_parameter("gamma", 0.0)?;
    let hkl = Vector3::new(1.0, 1.0, 0.0);
    let solution = session.hkl_to_angles(&hkl)?;
    let angles = session.physical_angles(&solution.position);
    println!("3. (1,1,0) at:");
    for (name, value) in session.geometry().physical_axis_names().iter().zip(&angles) {
        println!("   {name:>6} = {value:8.3}");
    }
    println!("   2θ = {:.3}°", solution.virtual_angles.two_theta.to_degrees());

    // 4. And back again
    let back = session.angles_to_hkl(&angles)?;
    println!("4. Back to hkl: ({:.4}, {:.4}, {:.4})", back.x, back.y, back.z);

    Ok(())
}
